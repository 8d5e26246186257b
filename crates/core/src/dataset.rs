use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The three published treemap datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dataset {
    #[default]
    VideoGameSales,
    KickstarterPledges,
    MovieSales,
}

impl Dataset {
    /// In the order the selection buttons are shown.
    pub const ALL: [Dataset; 3] = [
        Dataset::VideoGameSales,
        Dataset::MovieSales,
        Dataset::KickstarterPledges,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Dataset::VideoGameSales => "video-game-sales",
            Dataset::KickstarterPledges => "kickstarter-pledges",
            Dataset::MovieSales => "movie-sales",
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            Dataset::VideoGameSales => "https://cdn.freecodecamp.org/testable-projects-fcc/data/tree_map/video-game-sales-data.json",
            Dataset::KickstarterPledges => "https://cdn.freecodecamp.org/testable-projects-fcc/data/tree_map/kickstarter-funding-data.json",
            Dataset::MovieSales => "https://cdn.freecodecamp.org/testable-projects-fcc/data/tree_map/movie-data.json",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Dataset::VideoGameSales => "Video Game Sales",
            Dataset::KickstarterPledges => "Kickstarter Pledges",
            Dataset::MovieSales => "Movie Sales",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Dataset::VideoGameSales => "Top 100 Most Sold Video Games Grouped by Platform",
            Dataset::KickstarterPledges => {
                "Top 100 Most Funded Kickstarter Campaigns Grouped by Category"
            }
            Dataset::MovieSales => "Top 100 Highest Grossing Movies Grouped by Genre",
        }
    }

    pub fn button_label(&self) -> &'static str {
        match self {
            Dataset::VideoGameSales => "Video Game Data Set",
            Dataset::KickstarterPledges => "Kickstarter Data Set",
            Dataset::MovieSales => "Movies Data Set",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Dataset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dataset::ALL
            .into_iter()
            .find(|d| d.key() == s)
            .ok_or_else(|| Error::UnknownDataset(s.to_string()))
    }
}
