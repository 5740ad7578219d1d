//! Shared test harness modules for the summit CLI.

use super::*;

mod helpers;
mod prompt_unit;
mod unit;
