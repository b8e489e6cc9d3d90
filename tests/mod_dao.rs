mod common;

use common::{FixedConnection, FlakyCollection, NS, RATINGS, bound_dao, engine_with, fixture, idx};
use moviereviews::dao::{FilterSpec, MovieBinding, MovieFilter, MoviesDao, PageRequest, PageResult};
use moviereviews::errors::StorageError;
use std::sync::Arc;

#[tokio::test]
async fn defaults_return_first_twenty_and_full_count() {
    let (engine, _) = engine_with(fixture(45));
    let dao = bound_dao(engine.as_ref());

    let page = dao.get_movies(&MovieFilter::from(None::<FilterSpec>), PageRequest::default()).await;
    assert_eq!(page.items.len(), 20);
    assert_eq!(page.total_matching, 45);
    assert_eq!(idx(&page.items[0]), 0);
    assert_eq!(idx(&page.items[19]), 19);
}

#[tokio::test]
async fn page_two_of_ten_skips_exactly_twenty() {
    let (engine, _) = engine_with(fixture(45));
    let dao = bound_dao(engine.as_ref());

    let page = dao.get_movies(&MovieFilter::All, PageRequest::new(2, 10)).await;
    let got: Vec<i64> = page.items.iter().map(idx).collect();
    assert_eq!(got, (20..30).collect::<Vec<_>>());
    assert_eq!(page.total_matching, 45);

    let tail = dao.get_movies(&MovieFilter::All, PageRequest::new(4, 10)).await;
    assert_eq!(tail.items.len(), 5);
    assert_eq!(tail.total_matching, 45);

    let past_end = dao.get_movies(&MovieFilter::All, PageRequest::new(9, 10)).await;
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.total_matching, 45);
}

#[tokio::test]
async fn each_rating_returns_exactly_its_subset() {
    let (engine, _) = engine_with(fixture(30));
    let dao = bound_dao(engine.as_ref());

    for (r, code) in RATINGS.iter().enumerate() {
        let filter = MovieFilter::from(FilterSpec { title: None, rated: Some((*code).to_string()) });
        let page = dao.get_movies(&filter, PageRequest::new(0, 100)).await;
        let expected: Vec<i64> = (0..30).filter(|i| i % RATINGS.len() == r).map(|i| i as i64).collect();
        assert_eq!(page.items.iter().map(idx).collect::<Vec<_>>(), expected, "rating {code}");
        assert!(page.items.iter().all(|d| d.get_str("rated").unwrap() == *code));
        assert_eq!(page.total_matching, expected.len() as u64);
    }
}

#[tokio::test]
async fn title_search_ignores_rated() {
    let (engine, movies) = engine_with(fixture(10));
    movies.insert_document(bson::doc! { "title": "The Matrix", "rated": "R", "idx": 100_i64 });
    movies.insert_document(bson::doc! { "title": "The Matrix Reloaded", "rated": "R", "idx": 101_i64 });
    let dao = bound_dao(engine.as_ref());

    let spec = FilterSpec { title: Some("matrix".into()), rated: Some("PG".into()) };
    let page = dao.get_movies(&MovieFilter::from(spec), PageRequest::default()).await;
    assert_eq!(page.items.iter().map(idx).collect::<Vec<_>>(), vec![100, 101]);
    assert_eq!(page.total_matching, 2);
}

#[tokio::test]
async fn title_search_honours_exclusions_and_phrases() {
    let (engine, movies) = engine_with(Vec::new());
    movies.insert_document(bson::doc! { "title": "The Matrix", "rated": "R", "idx": 0_i64 });
    movies.insert_document(bson::doc! { "title": "The Matrix Reloaded", "rated": "R", "idx": 1_i64 });
    movies.insert_document(bson::doc! { "title": "Toy Story", "rated": "G", "idx": 2_i64 });
    let dao = bound_dao(engine.as_ref());
    let titles = |t: &str| MovieFilter::ByTitle(t.to_string());

    let only_excluded = dao.get_movies(&titles("-matrix"), PageRequest::default()).await;
    assert_eq!(only_excluded.total_matching, 0);

    let page = dao.get_movies(&titles("matrix story -reloaded"), PageRequest::default()).await;
    assert_eq!(page.items.iter().map(idx).collect::<Vec<_>>(), vec![0, 2]);

    let page = dao.get_movies(&titles("\"matrix reloaded\""), PageRequest::default()).await;
    assert_eq!(page.items.iter().map(idx).collect::<Vec<_>>(), vec![1]);
}

#[tokio::test]
async fn unbound_dao_returns_empty_page() {
    let dao = MoviesDao::new(Arc::new(MovieBinding::new(Some(NS.into()))));
    let page = dao.get_movies(&MovieFilter::All, PageRequest::default()).await;
    assert_eq!(page, PageResult::empty());
    assert!(matches!(dao.try_get_movies(&MovieFilter::All, PageRequest::default()).await, Err(StorageError::NotBound)));
}

#[tokio::test]
async fn find_or_count_failure_degrades_to_empty_page() {
    let (_, movies) = engine_with(fixture(12));
    for (fail_find, fail_count) in [(true, false), (false, true), (true, true)] {
        let flaky = Arc::new(FlakyCollection { inner: movies.clone(), fail_find, fail_count });
        let dao = bound_dao(&FixedConnection(flaky));

        let page = dao.get_movies(&MovieFilter::All, PageRequest::default()).await;
        assert!(page.items.is_empty());
        assert_eq!(page.total_matching, 0);
        assert!(dao.try_get_movies(&MovieFilter::All, PageRequest::default()).await.is_err());
    }
}

#[tokio::test]
async fn storage_rejections_degrade_to_empty_page() {
    // no text index: $text fails in storage
    let engine = moviereviews::storage::MemoryEngine::new();
    engine.collection_handle(NS, "movies").unwrap().insert_many(fixture(5));
    let dao = bound_dao(&engine);
    let by_title = MovieFilter::ByTitle("movie".into());
    assert_eq!(dao.get_movies(&by_title, PageRequest::default()).await, PageResult::empty());
    assert!(matches!(dao.try_get_movies(&by_title, PageRequest::default()).await, Err(StorageError::TextIndexRequired)));

    // negative page: negative skip rejected
    let negative = dao.get_movies(&MovieFilter::All, PageRequest::new(-1, 20)).await;
    assert_eq!(negative, PageResult::empty());
}

#[tokio::test]
async fn non_positive_page_size_passes_through() {
    let (engine, _) = engine_with(fixture(25));
    let dao = bound_dao(engine.as_ref());

    // zero limit means no limit; skip is page * 0 = 0
    let zero = dao.get_movies(&MovieFilter::All, PageRequest::new(3, 0)).await;
    assert_eq!(zero.items.len(), 25);

    // negative limit returns |n| documents; skip is 0 * -5 = 0
    let negative = dao.get_movies(&MovieFilter::All, PageRequest::new(0, -5)).await;
    assert_eq!(negative.items.len(), 5);
    assert_eq!(negative.total_matching, 25);
}

#[tokio::test]
async fn concurrent_queries_share_one_binding() {
    let (engine, _) = engine_with(fixture(40));
    let dao = bound_dao(engine.as_ref());
    let tasks: Vec<_> = (0..4)
        .map(|p| {
            let dao = dao.clone();
            tokio::spawn(async move { dao.get_movies(&MovieFilter::All, PageRequest::new(p, 10)).await })
        })
        .collect();
    for (p, t) in tasks.into_iter().enumerate() {
        let page = t.await.unwrap();
        assert_eq!(idx(&page.items[0]), p as i64 * 10);
        assert_eq!(page.total_matching, 40);
    }
}
