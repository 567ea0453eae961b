// Criterion benchmarks for the BMI LINE bot

use bmi_line_bot::core::{format_history, sign, verify_signature, ReplyFormatter};
use bmi_line_bot::models::{decode_history, Prediction, WebhookBody};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

const SECRET: &str = "bench-channel-secret";

fn create_webhook_body(events: usize) -> String {
    let events: Vec<_> = (0..events)
        .map(|i| {
            json!({
                "type": "message",
                "replyToken": format!("reply-{}", i),
                "message": {"type": "image", "id": i.to_string()}
            })
        })
        .collect();
    json!({"destination": "Ubench", "events": events}).to_string()
}

fn bench_signature(c: &mut Criterion) {
    let mut group = c.benchmark_group("signature");

    for event_count in [1, 10, 100].iter() {
        let body = create_webhook_body(*event_count);
        let signature = sign(SECRET, body.as_bytes()).unwrap();

        group.bench_with_input(
            BenchmarkId::new("verify", event_count),
            event_count,
            |b, _| {
                b.iter(|| {
                    verify_signature(
                        black_box(SECRET),
                        black_box(body.as_bytes()),
                        black_box(Some(signature.as_str())),
                    )
                });
            },
        );
    }

    group.finish();
}

fn bench_decode_events(c: &mut Criterion) {
    let body = create_webhook_body(10);

    c.bench_function("decode_10_events", |b| {
        b.iter(|| {
            let payload: WebhookBody = serde_json::from_str(black_box(&body)).unwrap();
            black_box(payload.decode_events())
        });
    });
}

fn bench_prediction_reply(c: &mut Criterion) {
    let formatter = ReplyFormatter::new(0.45, "https://img.test/bmi");
    let responses = [
        json!({"bmi": 24.7, "confidence": 0.83}),
        json!({"class_id": 1, "confidence": 0.9, "has_face": true, "face_count": 1}),
        json!({"predicted_class": "obese", "confidence": 0.6}),
        json!({"has_face": false}),
        json!({"unexpected": true}),
    ];

    c.bench_function("decode_and_format_prediction", |b| {
        b.iter(|| {
            for response in &responses {
                let prediction = Prediction::from_value(black_box(response));
                black_box(formatter.format_prediction(&prediction));
            }
        });
    });
}

fn bench_history(c: &mut Criterion) {
    let rows: Vec<_> = (0..20)
        .map(|i| {
            json!({
                "class_id": i % 5,
                "confidence": 0.5 + (i as f64) * 0.02,
                "has_face": true,
                "face_count": 1,
                "created_at": format!("2026-10-{:02}T08:00:00Z", i % 28 + 1)
            })
        })
        .collect();
    let body = json!({"history": rows});

    c.bench_function("history_20_entries", |b| {
        b.iter(|| {
            let entries = decode_history(black_box(&body)).unwrap();
            black_box(format_history(&entries))
        });
    });
}

criterion_group!(
    benches,
    bench_signature,
    bench_decode_events,
    bench_prediction_reply,
    bench_history
);

criterion_main!(benches);
