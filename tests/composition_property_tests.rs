//! Property-based composition tests
//!
//! Uses proptest to verify scheduling invariants over randomly generated
//! dependency graphs: required edges always set up first, instances are
//! constructed once, and teardown is the exact reverse of setup.

use std::cell::RefCell;

use async_trait::async_trait;
use proptest::prelude::*;

use modwire::{Injector, Module, ModuleCore, ModuleError, Orchestrator, RequirementSpec};

mod common;
use common::*;

thread_local! {
    static TOPOLOGY: RefCell<Vec<Vec<usize>>> = RefCell::new(Vec::new());
}

fn set_topology(required: Vec<Vec<usize>>) {
    TOPOLOGY.with(|topology| *topology.borrow_mut() = required);
}

fn required_deps(index: usize) -> Vec<usize> {
    TOPOLOGY.with(|topology| topology.borrow().get(index).cloned().unwrap_or_default())
}

macro_rules! node_class {
    ($name:ident, $index:expr) => {
        struct $name {
            core: ModuleCore,
        }

        impl Default for $name {
            fn default() -> Self {
                record(format!("construct:{}", $index));
                Self {
                    core: ModuleCore::new(),
                }
            }
        }

        #[async_trait]
        impl Module for $name {
            fn core(&self) -> &ModuleCore {
                &self.core
            }

            fn declare_dependencies(&self, injector: &Injector) -> Result<(), ModuleError> {
                for dep in required_deps($index) {
                    injector.request_dyn(format!("N{dep}"))?;
                }
                Ok(())
            }

            async fn setup(&self) -> Result<(), ModuleError> {
                record(format!("setup:{}", $index));
                self.core.mark_set_up();
                Ok(())
            }

            async fn teardown(&self) -> Result<(), ModuleError> {
                record(format!("teardown:{}", $index));
                self.core.clear_set_up();
                Ok(())
            }
        }
    };
}

node_class!(N0, 0);
node_class!(N1, 1);
node_class!(N2, 2);
node_class!(N3, 3);
node_class!(N4, 4);
node_class!(N5, 5);
node_class!(N6, 6);
node_class!(N7, 7);

fn registered_system() -> Orchestrator {
    let system = Orchestrator::new();
    system.register::<N0>().unwrap();
    system.register::<N1>().unwrap();
    system.register::<N2>().unwrap();
    system.register::<N3>().unwrap();
    system.register::<N4>().unwrap();
    system.register::<N5>().unwrap();
    system.register::<N6>().unwrap();
    system.register::<N7>().unwrap();
    system
}

/// Node `i` may only require nodes with smaller indices, so every generated
/// graph is acyclic by construction.
fn decode_edges(n: usize, bits: &[bool]) -> Vec<Vec<usize>> {
    let mut required = vec![Vec::new(); n];
    let mut bit = 0;
    for node in 1..n {
        for dep in 0..node {
            if bits[bit] {
                required[node].push(dep);
            }
            bit += 1;
        }
    }
    required
}

fn dag() -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<usize>)> {
    (2usize..=8).prop_flat_map(|n| {
        (
            proptest::collection::vec(any::<bool>(), n * (n - 1) / 2),
            Just((0..n).collect::<Vec<usize>>()).prop_shuffle(),
        )
            .prop_map(move |(bits, roots)| (decode_edges(n, &bits), roots))
    })
}

fn events_with_prefix(log: &EventLog, prefix: &str) -> Vec<String> {
    log.events()
        .iter()
        .filter(|event| event.starts_with(prefix))
        .map(|event| event[prefix.len()..].to_string())
        .collect()
}

proptest! {
    /// Property: setup is a topological order of the required edges, every
    /// instance is constructed exactly once, and teardown is the exact
    /// reverse of the realized setup order.
    #[test]
    fn setup_respects_required_edges_and_teardown_reverses_it(
        (required, roots) in dag(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime.block_on(async {
            let log = fresh_log();
            set_topology(required.clone());
            let system = registered_system();

            let spec = RequirementSpec::ordered(roots.iter().map(|i| format!("N{i}")));
            system.bootstrap(spec).unwrap();
            system.setup().await.unwrap();

            let n = required.len();
            for node in 0..n {
                prop_assert_eq!(log.count(&format!("construct:{node}")), 1);
            }

            let positions: Vec<usize> = (0..n)
                .map(|node| log.position(&format!("setup:{node}")).unwrap())
                .collect();
            for (node, deps) in required.iter().enumerate() {
                for &dep in deps {
                    prop_assert!(
                        positions[dep] < positions[node],
                        "node {} was set up before its dependency {}",
                        node,
                        dep
                    );
                }
            }

            system.teardown().await.unwrap();
            let setups = events_with_prefix(&log, "setup:");
            let mut teardowns = events_with_prefix(&log, "teardown:");
            teardowns.reverse();
            prop_assert_eq!(&teardowns, &setups);
            prop_assert!(system.modules().is_empty());
            Ok(())
        })?;
    }

    /// Property: splitting the roots into two bootstrap batches reuses the
    /// pool across batches and still tears everything down in one reverse
    /// pass over the combined setup history.
    #[test]
    fn accumulated_batches_unwind_in_one_reverse_pass(
        (required, roots) in dag(),
        split in any::<proptest::sample::Index>(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime.block_on(async {
            let log = fresh_log();
            set_topology(required.clone());
            let system = registered_system();

            let cut = split.index(roots.len() + 1);
            let (first, second) = roots.split_at(cut);
            for batch in [first, second] {
                if batch.is_empty() {
                    continue;
                }
                let spec = RequirementSpec::ordered(batch.iter().map(|i| format!("N{i}")));
                system.bootstrap(spec).unwrap();
                system.setup().await.unwrap();
            }

            let n = required.len();
            for node in 0..n {
                prop_assert_eq!(
                    log.count(&format!("construct:{node}")),
                    1,
                    "the second batch must reuse instances from the first"
                );
                prop_assert_eq!(log.count(&format!("setup:{node}")), 1);
            }

            system.teardown().await.unwrap();
            let setups = events_with_prefix(&log, "setup:");
            let mut teardowns = events_with_prefix(&log, "teardown:");
            teardowns.reverse();
            prop_assert_eq!(&teardowns, &setups);
            Ok(())
        })?;
    }
}
