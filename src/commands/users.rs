// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::Store;
use crate::utils::{fmt_local, maybe_print_json, pretty_table};
use anyhow::{Context, Result};

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").context("name is required")?;
            let id = store.ensure_user(name)?;
            println!("User '{}' (#{})", name.trim(), id);
        }
        Some(("list", sub)) => {
            let users = store.list_users()?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &users)? {
                let data = users
                    .iter()
                    .map(|u| {
                        vec![
                            u.id.to_string(),
                            u.username.clone(),
                            fmt_local(&u.created_at, store.offset()),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["ID", "Username", "Created"], data));
            }
        }
        _ => {}
    }
    Ok(())
}
