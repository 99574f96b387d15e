use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ledgerkit::{
    Account, AccountRegistry, JournalLine, LedgerStore, MemoryStore, PostEntry, PostingEngine,
    TrialBalanceReporter,
};
use rust_decimal::Decimal;
use time::{Date, Month};

const TENANT: &str = "bench";

fn setup() -> (Arc<dyn LedgerStore>, Account, Account) {
    let store: Arc<dyn LedgerStore> = Arc::new(MemoryStore::new());
    let registry = AccountRegistry::new(store.clone());
    let accounts = registry.provision_tenant(TENANT).unwrap();
    let by_code = |code: &str| accounts.iter().find(|a| a.code == code).unwrap().clone();
    (store, by_code("1101"), by_code("4101"))
}

fn entry(cash: &Account, sales: &Account, cents: i64) -> PostEntry {
    let amount = Decimal::new(cents, 2);
    PostEntry {
        date: Date::from_calendar_date(2024, Month::March, 1).unwrap(),
        reference: None,
        description: None,
        lines: vec![
            JournalLine {
                account_id: cash.id,
                description: None,
                debit: amount,
                credit: Decimal::ZERO,
            },
            JournalLine {
                account_id: sales.id,
                description: None,
                debit: Decimal::ZERO,
                credit: amount,
            },
        ],
    }
}

fn seed_entries(engine: &PostingEngine, cash: &Account, sales: &Account, count: i64) {
    for i in 0..count {
        engine
            .post_entry(TENANT, entry(cash, sales, 1_000 + i))
            .unwrap();
    }
}

fn bench_post_entry(c: &mut Criterion) {
    let (store, cash, sales) = setup();
    let engine = PostingEngine::new(store);

    c.bench_function("post_entry", |b| {
        b.iter(|| {
            engine
                .post_entry(TENANT, black_box(entry(&cash, &sales, 50_000)))
                .unwrap()
        })
    });
}

fn bench_trial_balance(c: &mut Criterion) {
    let (store, cash, sales) = setup();
    let engine = PostingEngine::new(store.clone());
    seed_entries(&engine, &cash, &sales, 100);

    let reporter = TrialBalanceReporter::new(store);
    c.bench_function("trial_balance_100_entries", |b| {
        b.iter(|| reporter.generate(black_box(TENANT)).unwrap())
    });
}

fn bench_list_entries(c: &mut Criterion) {
    let (store, cash, sales) = setup();
    let engine = PostingEngine::new(store);
    seed_entries(&engine, &cash, &sales, 100);

    c.bench_function("list_entries_100", |b| {
        b.iter(|| engine.list_entries(black_box(TENANT)).unwrap())
    });
}

fn bench_list_accounts(c: &mut Criterion) {
    let (store, _cash, _sales) = setup();
    let registry = AccountRegistry::new(store);

    c.bench_function("list_accounts", |b| {
        b.iter(|| registry.list_accounts(black_box(TENANT)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_post_entry,
    bench_trial_balance,
    bench_list_entries,
    bench_list_accounts
);
criterion_main!(benches);
