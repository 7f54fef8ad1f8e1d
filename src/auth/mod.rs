// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session-token authentication for the exam API.
//!
//! ## Auth Flow
//!
//! 1. Client posts credentials to `/v1/login`
//! 2. The matching database login routine confirms them
//! 3. Server issues an HS256 token carrying `user_id`, `is_professor`, `exp`
//! 4. Client sends `Authorization: Bearer <token>` on every protected route
//! 5. `/v1/logout` revokes the presented token
//!
//! ## Security
//!
//! - The signing secret is random per process; a restart logs everyone out
//! - Tokens live one hour and cannot be refreshed
//! - Revoked tokens are rejected until they would have expired anyway

pub mod claims;
pub mod codec;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod revocation;
pub mod roles;

pub use claims::{AuthenticatedUser, SessionClaims};
pub use codec::{TokenCodec, TokenError};
pub use error::AuthError;
pub use extractor::{Auth, BearerToken, ProfessorOnly, StudentOnly};
pub use gate::AuthGate;
pub use revocation::{InMemoryRevocationStore, RevocationStore, RevocationSweeper};
pub use roles::Role;
