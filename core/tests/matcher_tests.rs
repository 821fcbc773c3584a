use recommender::{rank, recommend, recommend_with, Catalog, LoadOptions, Post, Query, RecommendError, Strategy};
use std::collections::BTreeSet;

fn post(location: &str, tags: &str) -> Post {
    Post {
        id: 0,
        location: location.into(),
        hashtags: recommender::tags::parse_hashtags(tags),
        image_ref: format!("{location}.jpg"),
        title: None,
    }
}

fn sample() -> Catalog {
    Catalog::from_posts(vec![
        post("Paris", "food"),                   // 0: 1
        post("Paris", "food, cultural, art"),    // 1: 3
        post("Bali", "beach, food"),             // 2: 1
        post("Paris", "art, cultural"),          // 3: 2
        post("Paris", "nightlife"),              // 4: 0
        post("Paris", "cultural, food"),         // 5: 2
        post("Paris", ""),                       // 6: 0
    ])
    .unwrap()
}

fn ids(results: &[recommender::ScoredPost<'_>]) -> Vec<u32> {
    results.iter().map(|s| s.post.id).collect()
}

#[test]
fn it_round_trips_a_single_row() {
    let catalog = Catalog::load(
        "location,hashtag,image_url\nParis,\"cultural, food\",a.jpg\n".as_bytes(),
        &LoadOptions::default(),
    )
    .unwrap();
    let results = recommend(&catalog, &Query::new(Some("Paris"), "cultural"), 10).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 1);
    assert_eq!(results[0].post.image_ref, "a.jpg");
}

#[test]
fn prebuilt_tags_are_normalized_like_catalog_tags() {
    let catalog = Catalog::load(
        "location,hashtag,image_url\nParis,\"cultural, food\",a.jpg\n".as_bytes(),
        &LoadOptions::default(),
    )
    .unwrap();
    let q = Query::from_tags(Some("Paris"), ["Cultural", " #FOOD ", "#"]);
    assert_eq!(q.hashtags, BTreeSet::from(["cultural".to_string(), "food".to_string()]));

    let results = recommend(&catalog, &q, 10).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 2);
}

#[test]
fn empty_hashtags_return_nothing() {
    let catalog = sample();
    for location in [None, Some("Paris"), Some("Atlantis")] {
        let q = Query::new(location, "  ");
        assert!(recommend(&catalog, &q, 10).unwrap().is_empty());
        assert!(recommend_with(&catalog, &q, 10, Strategy::Nearest).unwrap().is_empty());
    }
}

#[test]
fn it_ranks_by_score_then_catalog_order() {
    let catalog = sample();
    let q = Query::new(Some("Paris"), "food, cultural, art");
    let results = recommend(&catalog, &q, 10).unwrap();
    assert_eq!(ids(&results), vec![1, 3, 5, 0]);
    let scores: Vec<usize> = results.iter().map(|s| s.score).collect();
    assert_eq!(scores, vec![3, 2, 2, 1]);
}

#[test]
fn scores_match_independent_intersection() {
    let catalog = sample();
    let q = Query::new(None, "food art beach");
    for s in recommend(&catalog, &q, 10).unwrap() {
        let expected = s.post.hashtags.intersection(&q.hashtags).count();
        assert!(s.score > 0);
        assert_eq!(s.score, expected);
    }
}

#[test]
fn missing_location_searches_everything() {
    let catalog = sample();
    let results = recommend(&catalog, &Query::new(None, "beach"), 10).unwrap();
    assert_eq!(ids(&results), vec![2]);
    // blank location behaves the same
    let results = recommend(&catalog, &Query::new(Some("  "), "beach"), 10).unwrap();
    assert_eq!(ids(&results), vec![2]);
}

#[test]
fn unknown_location_is_empty_not_an_error() {
    let catalog = sample();
    let results = recommend(&catalog, &Query::new(Some("Atlantis"), "food"), 10).unwrap();
    assert!(results.is_empty());
}

#[test]
fn zero_limit_is_invalid() {
    let catalog = sample();
    let err = recommend(&catalog, &Query::new(None, "food"), 0).unwrap_err();
    assert!(matches!(err, RecommendError::InvalidArgument(_)));
    let err = recommend_with(&catalog, &Query::new(None, "food"), 0, Strategy::Nearest).unwrap_err();
    assert!(matches!(err, RecommendError::InvalidArgument(_)));
}

#[test]
fn limit_truncates_to_top_entries() {
    // 15 qualifying posts; the last five share two tags and must lead
    let mut posts: Vec<Post> = (0..10).map(|_| post("Kyoto", "temple")).collect();
    posts.extend((0..5).map(|_| post("Kyoto", "temple, garden")));
    let catalog = Catalog::from_posts(posts).unwrap();
    let q = Query::new(Some("Kyoto"), "temple garden");

    let results = recommend(&catalog, &q, 10).unwrap();
    assert_eq!(results.len(), 10);
    assert_eq!(ids(&results), vec![10, 11, 12, 13, 14, 0, 1, 2, 3, 4]);
    assert_eq!(rank(&catalog, &q, Strategy::Overlap).len(), 15);
}

#[test]
fn nearest_mode_prefers_closest_posts() {
    let catalog = sample();
    let q = Query::from_tags(Some("Paris"), BTreeSet::from(["cultural".to_string(), "food".to_string()]));
    let results = recommend_with(&catalog, &q, 10, Strategy::Nearest).unwrap();

    // post 5 matches exactly; 0 and 1 differ by one feature, 3 by two
    assert_eq!(results[0].post.id, 5);
    assert_eq!(results[0].distance, Some(0.0));
    let distances: Vec<f32> = results.iter().map(|s| s.distance.unwrap()).collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    // ties stay in catalog order
    assert_eq!(ids(&results), vec![5, 0, 1, 3]);
    assert!(results.iter().all(|s| s.score > 0));
}

#[test]
fn nearest_mode_ignores_unknown_tags() {
    let catalog = sample();
    let results = recommend_with(&catalog, &Query::new(None, "beach, volcano"), 10, Strategy::Nearest).unwrap();
    assert_eq!(ids(&results), vec![2]);
    // query encodes to {beach}; post 2 is {Bali, beach, food}
    assert!((results[0].distance.unwrap() - 2f32.sqrt()).abs() < 1e-6);
}
