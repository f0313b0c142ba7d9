//! Marker types distinguishing kinds of [`DateTimeOf`] moments.
//!
//! [`DateTimeOf`]: crate::DateTimeOf

/// Moment an entity was created at (a listing publication, for example).
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Moment an entity stops being valid at (an access token, for example).
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
