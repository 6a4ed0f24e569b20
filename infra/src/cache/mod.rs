//! Cache module for Redis-backed challenge storage
//!
//! Provides the retrying Redis client and the TTL-based OTP challenge store.

pub mod otp_challenge_store;
pub mod redis_client;


pub use otp_challenge_store::RedisOtpChallengeRepository;
pub use redis_client::RedisClient;
