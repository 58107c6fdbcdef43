//! Bearer-token authentication.
//!
//! # Components
//!
//! - `claims` - verified claim bag produced by a successful validation
//! - `validator` - header parsing and RS256 signature verification
//! - `tier` - extraction of the `tier` claim from verified claims
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only the RSA signature family (RS256/RS384/RS512) is accepted; the
//!   declared algorithm is checked before any cryptographic work so an
//!   attacker cannot substitute `none` or an HMAC algorithm
//! - Client-visible error messages are generic; variant detail is logged
//!   at debug level only

pub mod claims;
pub mod tier;
pub mod validator;

pub use claims::VerifiedClaims;
pub use tier::{resolve_tier, ClaimError, TIER_CLAIM};
pub use validator::{AuthError, TokenValidator};
