pub mod otp_challenges;
