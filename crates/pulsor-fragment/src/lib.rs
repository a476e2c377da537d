//! # pulsor-fragment
//!
//! HTML fragment and template loaders exposed as async pulsers.
//!
//! - `fetch:fragment` resolves `<name>.html` to its `<template>` body, or the
//!   whole file when it has none
//! - `fetch:template` resolves `template.<name>.html` to its `<template>` body
//!
//! Files come from a [`FragmentSource`]; [`DirectorySource`] reads them from
//! disk. Callbacks bound to either alias are told which name was loaded.

pub mod extract;
pub mod install;
pub mod source;

pub use extract::{extract_fragment, extract_template, template_file_name};
pub use install::{install_fetch_fragment, install_fetch_template, FETCH_FRAGMENT, FETCH_TEMPLATE};
pub use source::{validate_name, DirectorySource, FragmentError, FragmentSource, MemorySource};
