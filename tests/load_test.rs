//! Concurrent load against the quiz service.

use std::net::SocketAddr;
use std::collections::HashSet;
use std::time::{Duration, Instant};

use quiz_service::quiz::QuestionId;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_concurrent_identical_creates() {
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let qs_addr = common::start_question_service(addr, move |_request| async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        (200, "[10, 20, 30]".into())
    })
    .await;

    let service = common::start_quiz_service(common::test_config(qs_addr)).await;

    let concurrency = 10;
    let requests_per_task = 10;
    let total_requests = concurrency * requests_per_task;

    let client = common::client();
    let start = Instant::now();

    let mut tasks = Vec::new();
    for _ in 0..concurrency {
        let client = client.clone();
        let url = service.url("/quiz/create");
        tasks.push(tokio::spawn(async move {
            let mut latencies = Vec::new();
            for _ in 0..requests_per_task {
                let req_start = Instant::now();
                let res = client
                    .post(&url)
                    .json(&json!({ "categoryName": "java", "numQuestions": 3, "title": "Same" }))
                    .send()
                    .await;
                if let Ok(res) = res {
                    if res.status().as_u16() == 201 {
                        latencies.push(req_start.elapsed());
                    }
                }
            }
            latencies
        }));
    }

    let mut all_latencies = Vec::new();
    for task in tasks {
        all_latencies.extend(task.await.unwrap());
    }
    let duration = start.elapsed();

    assert_eq!(all_latencies.len(), total_requests, "Every create should succeed");

    // Identical requests are not deduplicated.
    let quizzes = service.store.all();
    assert_eq!(quizzes.len(), total_requests);
    let ids: HashSet<_> = quizzes.iter().map(|q| q.id.clone().unwrap()).collect();
    assert_eq!(ids.len(), total_requests);
    let expected = vec![QuestionId::from(10), QuestionId::from(20), QuestionId::from(30)];
    assert!(quizzes.iter().all(|q| q.question_ids == expected));

    all_latencies.sort();
    let p50 = all_latencies[all_latencies.len() / 2];
    let p99 = all_latencies[(all_latencies.len() as f64 * 0.99) as usize];

    println!("\n--- Load Test Results ---");
    println!("Total Requests: {}", total_requests);
    println!("Concurrency:    {}", concurrency);
    println!("Total Duration: {:?}", duration);
    println!("P50 Latency:    {:?}", p50);
    println!("P99 Latency:    {:?}", p99);
    println!("-------------------------\n");

    service.shutdown.trigger();
}
