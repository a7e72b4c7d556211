// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::prelude::*;
use sortition_pool::{ChaChaDraw, DrawSource, PoolError, Seed, SortitionPool};
use tracing::{info, warn};

/// Message: register an operator with a positive weight.
#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<(), PoolError>")]
pub struct InsertOperator {
    pub id: String,
    pub weight: u64,
}

/// Message: remove an operator from the pool.
#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<(), PoolError>")]
pub struct RemoveOperator {
    pub id: String,
}

/// Message: change an operator's weight in place.
#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<(), PoolError>")]
pub struct UpdateOperatorWeight {
    pub id: String,
    pub weight: u64,
}

/// Message: select a group of `size` operators with replacement.
#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<Vec<String>, PoolError>")]
pub struct SelectGroup {
    pub size: usize,
    pub seed: Seed,
}

/// Message: select a group of `size` distinct operators.
#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<Vec<String>, PoolError>")]
pub struct SelectSetGroup {
    pub size: usize,
    pub seed: Seed,
}

/// Message: count of active operators.
#[derive(Message, Clone, Debug)]
#[rtype(result = "usize")]
pub struct GetPoolSize;

/// Message: current trunk sum.
#[derive(Message, Clone, Debug)]
#[rtype(result = "u64")]
pub struct GetTotalWeight;

/// Message: weight of a single operator.
#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<u64, PoolError>")]
pub struct GetOperatorWeight {
    pub id: String,
}

/// Actor owning a single sortition pool.
///
/// The mailbox serializes every insert, remove, update and selection, so a
/// without-replacement pass always completes (including restoration of the
/// provisionally zeroed leaves) before the next operation is handled.
pub struct PoolManager<D = ChaChaDraw> {
    pool: SortitionPool<String>,
    draw: D,
}

impl PoolManager<ChaChaDraw> {
    pub fn new(capacity: usize) -> Self {
        Self::with_draw_source(capacity, ChaChaDraw)
    }

    /// Start a manager with the default draw source.
    pub fn attach(capacity: usize) -> Addr<Self> {
        PoolManager::new(capacity).start()
    }
}

impl<D: DrawSource> PoolManager<D> {
    pub fn with_draw_source(capacity: usize, draw: D) -> Self {
        Self {
            pool: SortitionPool::new(capacity),
            draw,
        }
    }
}

impl<D: DrawSource + Unpin + 'static> Actor for PoolManager<D> {
    type Context = Context<Self>;
}

impl<D: DrawSource + Unpin + 'static> Handler<InsertOperator> for PoolManager<D> {
    type Result = Result<(), PoolError>;

    fn handle(&mut self, msg: InsertOperator, _ctx: &mut Self::Context) -> Self::Result {
        let result = self.pool.insert_operator(msg.id.clone(), msg.weight);
        match &result {
            Ok(()) => info!(
                operator = %msg.id,
                weight = msg.weight,
                "Operator added to sortition pool"
            ),
            Err(err) => warn!(operator = %msg.id, %err, "Failed to add operator"),
        }
        result
    }
}

impl<D: DrawSource + Unpin + 'static> Handler<RemoveOperator> for PoolManager<D> {
    type Result = Result<(), PoolError>;

    fn handle(&mut self, msg: RemoveOperator, _ctx: &mut Self::Context) -> Self::Result {
        let result = self.pool.remove_operator(&msg.id);
        match &result {
            Ok(()) => info!(operator = %msg.id, "Operator removed from sortition pool"),
            Err(err) => warn!(operator = %msg.id, %err, "Failed to remove operator"),
        }
        result
    }
}

impl<D: DrawSource + Unpin + 'static> Handler<UpdateOperatorWeight> for PoolManager<D> {
    type Result = Result<(), PoolError>;

    fn handle(&mut self, msg: UpdateOperatorWeight, _ctx: &mut Self::Context) -> Self::Result {
        let result = self.pool.update_operator_weight(&msg.id, msg.weight);
        match &result {
            Ok(()) => info!(
                operator = %msg.id,
                weight = msg.weight,
                "Operator weight updated"
            ),
            Err(err) => warn!(operator = %msg.id, %err, "Failed to update operator weight"),
        }
        result
    }
}

impl<D: DrawSource + Unpin + 'static> Handler<SelectGroup> for PoolManager<D> {
    type Result = Result<Vec<String>, PoolError>;

    fn handle(&mut self, msg: SelectGroup, _ctx: &mut Self::Context) -> Self::Result {
        let result = self.pool.select_group(msg.size, msg.seed, &self.draw);
        match &result {
            Ok(group) => info!(size = group.len(), seed = %msg.seed, "Selected group"),
            Err(err) => warn!(size = msg.size, %err, "Group selection failed"),
        }
        result
    }
}

impl<D: DrawSource + Unpin + 'static> Handler<SelectSetGroup> for PoolManager<D> {
    type Result = Result<Vec<String>, PoolError>;

    fn handle(&mut self, msg: SelectSetGroup, _ctx: &mut Self::Context) -> Self::Result {
        let result = self.pool.select_set_group(msg.size, msg.seed, &self.draw);
        match &result {
            Ok(group) => info!(size = group.len(), seed = %msg.seed, "Selected set group"),
            Err(err) => warn!(size = msg.size, %err, "Set group selection failed"),
        }
        result
    }
}

impl<D: DrawSource + Unpin + 'static> Handler<GetPoolSize> for PoolManager<D> {
    type Result = usize;

    fn handle(&mut self, _msg: GetPoolSize, _ctx: &mut Self::Context) -> Self::Result {
        self.pool.size()
    }
}

impl<D: DrawSource + Unpin + 'static> Handler<GetTotalWeight> for PoolManager<D> {
    type Result = u64;

    fn handle(&mut self, _msg: GetTotalWeight, _ctx: &mut Self::Context) -> Self::Result {
        self.pool.total_weight()
    }
}

impl<D: DrawSource + Unpin + 'static> Handler<GetOperatorWeight> for PoolManager<D> {
    type Result = Result<u64, PoolError>;

    fn handle(&mut self, msg: GetOperatorWeight, _ctx: &mut Self::Context) -> Self::Result {
        self.pool.weight_of(&msg.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> Seed {
        Seed::from(0xff39_d6cc_a878_5389u64)
    }

    async fn populate(addr: &Addr<PoolManager>, ops: &[(&str, u64)]) {
        for (id, weight) in ops {
            addr.send(InsertOperator {
                id: id.to_string(),
                weight: *weight,
            })
            .await
            .unwrap()
            .unwrap();
        }
    }

    #[actix::test]
    async fn selects_a_group_through_the_mailbox() {
        let addr = PoolManager::attach(64);
        populate(&addr, &[("a", 10), ("b", 11), ("c", 12)]).await;

        let group = addr
            .send(SelectGroup {
                size: 3,
                seed: seed(),
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(group.len(), 3);
    }

    #[actix::test]
    async fn reports_an_empty_pool() {
        let addr = PoolManager::attach(64);
        let result = addr
            .send(SelectGroup {
                size: 3,
                seed: seed(),
            })
            .await
            .unwrap();
        assert_eq!(result, Err(PoolError::EmptyPool));
    }

    #[actix::test]
    async fn set_group_requires_enough_distinct_operators() {
        let addr = PoolManager::attach(64);
        populate(&addr, &[("a", 10), ("b", 11)]).await;

        let result = addr
            .send(SelectSetGroup {
                size: 3,
                seed: seed(),
            })
            .await
            .unwrap();
        assert_eq!(
            result,
            Err(PoolError::NotEnoughOperators {
                available: 2,
                requested: 3
            })
        );
    }

    #[actix::test]
    async fn set_group_leaves_the_pool_untouched() {
        let addr = PoolManager::attach(64);
        populate(&addr, &[("a", 10), ("b", 11), ("c", 12), ("d", 5), ("e", 1)]).await;

        let total_before = addr.send(GetTotalWeight).await.unwrap();
        let group = addr
            .send(SelectSetGroup {
                size: 5,
                seed: seed(),
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(group.len(), 5);

        assert_eq!(addr.send(GetTotalWeight).await.unwrap(), total_before);
        assert_eq!(addr.send(GetPoolSize).await.unwrap(), 5);
        for (id, weight) in [("a", 10u64), ("b", 11), ("c", 12), ("d", 5), ("e", 1)] {
            let got = addr
                .send(GetOperatorWeight { id: id.to_string() })
                .await
                .unwrap()
                .unwrap();
            assert_eq!(got, weight);
        }
    }

    #[actix::test]
    async fn removal_frees_weight_for_reuse() {
        let addr = PoolManager::attach(64);
        populate(&addr, &[("a", 10), ("b", 11)]).await;

        addr.send(RemoveOperator {
            id: "b".to_string(),
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(addr.send(GetTotalWeight).await.unwrap(), 10);

        addr.send(UpdateOperatorWeight {
            id: "a".to_string(),
            weight: 4,
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(addr.send(GetTotalWeight).await.unwrap(), 4);
    }
}
