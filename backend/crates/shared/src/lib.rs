//! Shared Kernel
//!
//! Vocabulary shared by every backend crate:
//! - Unified error type ([`error::app_error::AppError`]) and its classification
//! - Typed identifiers ([`id::Id`])
//!
//! Only things whose meaning is the same in every domain belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
