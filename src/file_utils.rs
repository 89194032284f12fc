//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use dirs;
use std::path::PathBuf;
use std::result::Result;

use crate::error::{ia_err, DataApiError};

/// Generates the absolute file path of the path provided based on the underlying platform
///
/// A leading `~/` (or `~\`) is replaced by the current user's home directory.
/// Other paths are returned unchanged.
pub(crate) fn expand_user_home(file_path: &str) -> Result<String, DataApiError> {
    if file_path.starts_with("~/") || file_path.starts_with("~\\") {
        match dirs::home_dir() {
            Some(home_dir) => {
                let full_path = home_dir.join(PathBuf::from(correct_path(&file_path[2..])));
                Ok(format!("{}", full_path.display()))
            }
            None => ia_err!("cannot expand '{}': no home directory", file_path),
        }
    } else {
        Ok(String::from(file_path))
    }
}

/// Read a whole file into a string, expanding `~` first.
pub(crate) fn file_to_string(file_path: &str) -> Result<String, DataApiError> {
    let path = expand_user_home(file_path)?;
    match std::fs::read_to_string(&path) {
        Ok(s) => Ok(s),
        Err(e) => ia_err!("error reading file '{}': {}", path, e),
    }
}

fn correct_path(file_path: &str) -> String {
    if cfg!(target_os = "windows") {
        file_path.replace('/', "\\")
    } else {
        String::from(file_path)
    }
}
