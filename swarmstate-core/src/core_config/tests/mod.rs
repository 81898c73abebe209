/*
    Merge-law test suites for core_config

    - Idempotence, commutativity and convergence of ConfigState::merge
    - Forward compatibility of unknown fields across merge/dump/load
    - Property tests over random message sets and delivery orders
*/

mod helpers;

pub mod forward_compat;
