// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn core_validation_passes_through() {
    let err: Error = gs_core::Error::UnknownCollection("pets".into()).into();
    assert!(err.is_validation());
    assert!(err.to_string().contains("unknown collection"));
}

#[test]
fn storage_errors_are_not_validation() {
    assert!(!Error::Storage("disk full".into()).is_validation());
    assert!(!Error::MutationNotFound("mut-1".into()).is_validation());
}

#[test]
fn locked_names_the_directory() {
    let err = Error::Locked(PathBuf::from("/var/lib/gurusync"));
    assert!(err.to_string().contains("/var/lib/gurusync"));
}
