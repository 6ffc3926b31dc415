// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::KEYS;
use crate::store::Store;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};

pub fn handle(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), store.config())? {
                let mut data = Vec::new();
                for key in KEYS {
                    data.push(vec![key.to_string(), store.config().get(key)?]);
                }
                println!("{}", pretty_table(&["Key", "Value"], data));
            }
        }
        Some(("get", sub)) => {
            let key = sub.get_one::<String>("key").context("key is required")?;
            println!("{}", store.config().get(key)?);
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").context("key is required")?;
            let value = sub.get_one::<String>("value").context("value is required")?;
            store.set_config(key, value)?;
            println!("{} = {}", key.trim(), store.config().get(key)?);
        }
        _ => {}
    }
    Ok(())
}
