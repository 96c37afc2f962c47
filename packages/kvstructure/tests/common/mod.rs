#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// A record exercising every field disposition.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
    pub desc: String,
    pub cond: bool,
    pub proto: String,
    pub tests: Vec<Box<Test>>,
    pub with_omit: String,
    pub ignore: String,
}

kvstructure::structure! {
    Test {
        desc { kvstructure = "description,omitempty" },
        cond { kvstructure = "condition", json = "peer,omitempty" },
        proto { protobuf = "bytes,1,opt,name=proto,proto3", json = "proto" },
        tests,
        with_omit { json = "with_omit,omitempty" },
        ignore { json = "-" },
    }
}

pub fn sample() -> Test {
    Test {
        desc: "bar".to_string(),
        cond: true,
        tests: vec![Box::new(Test {
            desc: "bar".to_string(),
            cond: true,
            ..Default::default()
        })],
        ..Default::default()
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
