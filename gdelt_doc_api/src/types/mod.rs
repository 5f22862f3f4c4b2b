mod article;
pub use self::article::{Article, ArticleList, ArticleResponse, GDELT_DATETIME_FORMAT};

mod timeline;
pub use self::timeline::{
    Timeline, TimelinePoint, TimelineResponse, TimelineRow, TimelineSeries, ALL_ARTICLES_COLUMN,
    DATETIME_COLUMN,
};
