use community_portal::services::validation::{PhoneNumber, ProfileCompletionRequest};
use community_portal::services::navigation::render_navigation;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn benchmark_phone_parse(c: &mut Criterion) {
    let inputs = [
        "9876543210",
        "(987) 654-3210",
        "+91 98765 43210",
        "12345",
        "+12345678901234",
    ];

    let mut group = c.benchmark_group("phone_validation");

    group.bench_function("parse_mixed_inputs", |b| {
        b.iter(|| {
            for input in inputs {
                let _ = PhoneNumber::parse(black_box(input));
            }
        })
    });

    let request = ProfileCompletionRequest {
        phone: " 987-654-3210 ".to_string(),
        institution: "  College of Engineering Pune ".to_string(),
    };
    group.bench_function("completion_form_check", |b| {
        b.iter(|| black_box(request.clone()).trimmed().check())
    });

    group.finish();
}

fn benchmark_navigation(c: &mut Criterion) {
    c.bench_function("render_navigation_signed_out", |b| {
        b.iter(|| render_navigation(black_box(None), black_box(false)))
    });
}

criterion_group!(benches, benchmark_phone_parse, benchmark_navigation);
criterion_main!(benches);
