//! Database backend implementations.
//!
//! Each backend is gated behind a feature flag.
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | PostgreSQL | `postgres` | Pooled `tokio-postgres` connections with the RDKit cartridge |

#[cfg(feature = "postgres")]
pub mod postgres;
