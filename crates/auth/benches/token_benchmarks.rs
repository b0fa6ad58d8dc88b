use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use staffsync_auth::{authorize, AuthConfig, Identity, NewIdentity, Posture, Role, TokenService};
use staffsync_core::{Email, IdentityId, Organization};

fn tokens() -> TokenService {
    let config = AuthConfig::from_secret(Some("bench-secret-bench-secret-bench-secret".into()), Posture::Production)
        .expect("valid bench config");
    TokenService::new(&config)
}

fn identity(org: &str) -> Identity {
    NewIdentity {
        name: "Bench".into(),
        email: Email::parse("bench@example.com").unwrap(),
        phone: None,
        password_hash: String::new(),
        role: Role::Admin,
        organization: Organization::parse(org).unwrap(),
    }
    .into_identity(Utc::now())
}

fn bench_token_issue(c: &mut Criterion) {
    let tokens = tokens();
    let subject = IdentityId::new();
    c.bench_function("token_issue", |b| b.iter(|| tokens.issue(black_box(subject)).unwrap()));
}

fn bench_token_verify(c: &mut Criterion) {
    let tokens = tokens();
    let token = tokens.issue(IdentityId::new()).unwrap();
    c.bench_function("token_verify", |b| b.iter(|| tokens.verify(black_box(&token)).unwrap()));
}

fn bench_authorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("authorize");
    let caller = identity("Acme Corporation");
    for target in ["Acme Corporation", "Globex Corporation"] {
        let target_org = Organization::parse(target).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(target), &target_org, |b, org| {
            b.iter(|| authorize(black_box(&caller), black_box(org)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_token_issue, bench_token_verify, bench_authorize);
criterion_main!(benches);
