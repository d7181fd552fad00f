//! Classification of provider services.
//!
//! The panel's catalogue has no structured platform field, so it is inferred from the service name and category
//! text. The first keyword that matches wins.

const PLATFORMS: &[(&str, &[&str])] = &[
    ("instagram", &["instagram", "insta", "인스타"]),
    ("youtube", &["youtube", "유튜브"]),
    ("tiktok", &["tiktok", "tik tok", "틱톡"]),
    ("facebook", &["facebook", "페이스북"]),
    ("twitter", &["twitter", "x.com", "트위터"]),
    ("telegram", &["telegram", "텔레그램"]),
];

const CATEGORIES: &[(&str, &[&str])] = &[
    ("followers", &["follower", "팔로워"]),
    ("subscribers", &["subscriber", "구독자", "members"]),
    ("likes", &["like", "좋아요"]),
    ("views", &["view", "조회수", "plays"]),
    ("comments", &["comment", "댓글"]),
];

fn classify(text: &str, table: &[(&'static str, &[&str])]) -> &'static str {
    let text = text.to_lowercase();
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(name, _)| *name)
        .unwrap_or("other")
}

pub fn derive_platform(name: &str, category: &str) -> &'static str {
    classify(&format!("{name} {category}"), PLATFORMS)
}

pub fn derive_category(name: &str, category: &str) -> &'static str {
    classify(&format!("{name} {category}"), CATEGORIES)
}
