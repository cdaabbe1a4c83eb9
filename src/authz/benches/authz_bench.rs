//! Authorization engine benchmarks
//!
//! Steady-state check latency against pre-built engines: grant-table
//! scans, hierarchy walks, and rule evaluation.

use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use warden_authz::{
    keys, AccessRequest, Action, AuthUserInfo, Context, ContextValue, Domain, Engine,
    PermissionRule, ResourceId, ResourceType, Role, RoleHierarchy, UserId,
};

/// Engine with one role granted `count` actions on one resource type
fn engine_with_grants(count: usize) -> Engine {
    let domain = Domain::new("bench");
    let document = ResourceType::new(domain.clone(), "document");
    let worker = Role::system("worker");

    let mut builder = Engine::builder().resource(document.clone());
    for i in 0..count {
        let action = Action::new(domain.clone(), format!("a{}", i));
        builder = builder
            .action(action.clone())
            .permission(worker.clone(), action, document.clone(), PermissionRule::allow_all());
    }
    builder.build().unwrap()
}

/// Engine with a parent chain of `depth` roles and a single grant at the root
fn engine_with_chain(depth: usize) -> Engine {
    let domain = Domain::new("bench");
    let view = Action::new(domain.clone(), "view");
    let document = ResourceType::new(domain.clone(), "document");

    let mut builder = Engine::builder()
        .action(view.clone())
        .resource(document.clone())
        .permission(Role::system("r0"), view, document, PermissionRule::allow_all());
    for i in 1..depth {
        builder = builder.edge(
            Role::system(format!("r{}", i - 1)),
            Role::system(format!("r{}", i)),
        );
    }
    builder.build().unwrap()
}

fn bench_check_by_grant_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_by_grant_count");

    for grant_count in [10, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("grants", grant_count),
            grant_count,
            |b, &count| {
                let engine = engine_with_grants(count);
                let domain = Domain::new("bench");
                let user = AuthUserInfo::new(UserId(1)).with_role(Role::system("worker"));
                // The last-configured grant sits at the end of the scan.
                let action_id = format!("a{}", count - 1);

                b.iter(|| {
                    let allowed =
                        engine.check(black_box(&user), &domain, &action_id, "document", None);
                    black_box(allowed);
                });
            },
        );
    }

    group.finish();
}

fn bench_check_by_hierarchy_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_by_hierarchy_depth");

    for depth in [4, 16, 64].iter() {
        group.bench_with_input(BenchmarkId::new("depth", depth), depth, |b, &depth| {
            let engine = engine_with_chain(depth);
            let domain = Domain::new("bench");
            let leaf = Role::system(format!("r{}", depth - 1));
            let user = AuthUserInfo::new(UserId(1)).with_role(leaf);

            b.iter(|| {
                let allowed = engine.check(black_box(&user), &domain, "view", "document", None);
                black_box(allowed);
            });
        });
    }

    group.finish();
}

fn bench_ancestor_closure(c: &mut Criterion) {
    let mut group = c.benchmark_group("ancestor_closure");

    for parent_count in [10, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("parents", parent_count),
            parent_count,
            |b, &count| {
                let mut hierarchy = RoleHierarchy::new();
                let leaf = Role::system("leaf");
                for i in 0..count {
                    hierarchy
                        .add_edge(Role::system(format!("p{}", i)), leaf.clone())
                        .unwrap();
                }

                b.iter(|| {
                    let ancestors = hierarchy.all_ancestors(black_box(&leaf));
                    black_box(ancestors);
                });
            },
        );
    }

    group.finish();
}

fn bench_rule_evaluation(c: &mut Criterion) {
    c.bench_function("rule_evaluation", |b| {
        let domain = Domain::new("bench");
        let action = Action::new(domain.clone(), "edit");
        let resource_type = ResourceType::new(domain, "document");
        let user = AuthUserInfo::new(UserId(42));
        let context = Context::new().with(
            keys::OWNER_ID_PROVIDER,
            ContextValue::owner_provider(|_| Some(UserId(42))),
        );

        let rule = PermissionRule::new()
            .condition(|req| Ok(req.resource_id.is_some()))
            .owner_only();

        let req = AccessRequest {
            user: &user,
            action: &action,
            resource_type: &resource_type,
            resource_id: Some(ResourceId(7)),
            context: &context,
        };

        b.iter(|| {
            let satisfied = rule.evaluate(black_box(&req));
            black_box(satisfied);
        });
    });
}

criterion_group!(
    benches,
    bench_check_by_grant_count,
    bench_check_by_hierarchy_depth,
    bench_ancestor_closure,
    bench_rule_evaluation
);
criterion_main!(benches);
