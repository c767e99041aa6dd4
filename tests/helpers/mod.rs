pub mod cli;

use dbdiff::catalog::Database;
use dbdiff::config::{Config, DialectKind};
use dbdiff::loader::load_str;
use dbdiff::output::{Stage, StageRouter};
use dbdiff::{build_database, diff_databases};

pub fn load(xml: &str) -> Database {
    load_str(xml, "fixture.xml").expect("fixture should load")
}

pub fn config_for(dialect: DialectKind) -> Config {
    Config {
        dialect,
        ..Config::default()
    }
}

pub fn diff(old: &str, new: &str, config: &Config) -> StageRouter {
    diff_databases(&load(old), &load(new), config).expect("diff should succeed")
}

pub fn build(xml: &str, config: &Config) -> StageRouter {
    build_database(&load(xml), config).expect("build should succeed")
}

/// SQL text of one stage in emission order.
pub fn stage_sql(router: &StageRouter, stage: Stage) -> Vec<String> {
    router.stage(stage).iter().map(|s| s.sql.clone()).collect()
}

/// Every statement with its stage, in apply order.
pub fn all_sql(router: &StageRouter) -> Vec<(Stage, String)> {
    Stage::ALL
        .into_iter()
        .flat_map(|stage| {
            router
                .stage(stage)
                .iter()
                .map(move |s| (stage, s.sql.clone()))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Stage of the first statement containing `needle`.
pub fn stage_of(router: &StageRouter, needle: &str) -> Option<Stage> {
    all_sql(router)
        .into_iter()
        .find(|(_, sql)| sql.contains(needle))
        .map(|(stage, _)| stage)
}

/// Position of the first statement containing `needle` in apply order.
pub fn position_of(router: &StageRouter, needle: &str) -> usize {
    all_sql(router)
        .iter()
        .position(|(_, sql)| sql.contains(needle))
        .unwrap_or_else(|| panic!("no statement contains {needle:?}"))
}
