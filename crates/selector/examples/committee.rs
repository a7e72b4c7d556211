// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use sortition_pool::Seed;
use sortition_selector::{InsertOperator, PoolManager, SelectGroup, SelectSetGroup};
use tracing_subscriber::{fmt, EnvFilter};

#[actix::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let pool = PoolManager::attach(1024);
    for (id, weight) in [("alice", 10), ("bob", 11), ("carol", 12), ("dave", 5), ("eve", 1)] {
        pool.send(InsertOperator {
            id: id.to_string(),
            weight,
        })
        .await??;
    }

    let seed = Seed::from(0xff39_d6cc_a878_5389u64);
    let group = pool.send(SelectGroup { size: 3, seed }).await??;
    println!("group (with replacement): {group:?}");

    let committee = pool.send(SelectSetGroup { size: 3, seed }).await??;
    println!("committee (distinct): {committee:?}");

    Ok(())
}
