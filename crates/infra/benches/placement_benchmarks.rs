use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use orderdesk_clients::Client;
use orderdesk_core::{ArticleId, ClientId};
use orderdesk_infra::placement::PlacementService;
use orderdesk_infra::store::InMemoryStore;
use orderdesk_inventory::Article;
use orderdesk_orders::{OrderLine, OrderRequest};

fn seeded(article_count: i64) -> (InMemoryStore, PlacementService) {
    let store = InMemoryStore::new();
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        store
            .seed_client(
                Client::new(ClientId::new(1), "Acme", "Main Street 1", "Vienna", "AT").unwrap(),
            )
            .await;
        for id in 1..=article_count {
            store
                .seed_article(
                    Article::new(ArticleId::new(id), format!("article {id}"), 250, i64::MAX / 2)
                        .unwrap(),
                )
                .await;
        }
    });
    let svc = PlacementService::new(Arc::new(store.clone()));
    (store, svc)
}

fn bench_place_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("place_order");

    for line_count in [1i64, 4, 16] {
        let (_store, svc) = seeded(line_count);
        let lines: Vec<OrderLine> = (1..=line_count)
            .map(|id| OrderLine {
                article_id: ArticleId::new(id),
                amount: 1,
            })
            .collect();
        let request = OrderRequest::new(ClientId::new(1), lines).unwrap();

        group.throughput(Throughput::Elements(line_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(line_count),
            &request,
            |b, request| {
                b.iter(|| {
                    rt.block_on(async { svc.place_order(request).await.unwrap() });
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_place_order);
criterion_main!(benches);
