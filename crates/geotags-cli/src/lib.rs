//! geotags-cli
//! ===========
//!
//! Command-line interface for `geotags-core`.
//!
//! This crate primarily provides a binary (`geotags`). The library target
//! exists so docs.rs renders this overview.
//!
//! Basic usage:
//!
//! ```text
//! geotags --help
//! geotags parse 10 N 20 E
//! geotags globes
//! geotags tag 42 "55.75|37.62|primary"
//! geotags search --page 42 --radius 5000 --primary all
//! ```
//!
//! `--store` names the bincode snapshot the `tag`, `search` and `list`
//! commands share; `--config` loads a JSON `GeoConfig`.
//!
//! For programmatic access use the [`geotags-core`] crate directly.
#![cfg_attr(docsrs, feature(doc_cfg))]
