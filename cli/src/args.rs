use clap::{Args, Parser, Subcommand};
use cookbook_sdk::SearchParams;

#[derive(Parser)]
#[command(author, version, about = "Search and manage recipes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search recipes with filters and ordering
    Search(SearchArgs),
    /// Free-text relevance search
    Find {
        /// Text to search for
        #[arg(value_name = "QUERY")]
        text: String,
        #[command(flatten)]
        filters: SearchArgs,
    },
    /// Autocomplete suggestions for a partial query
    Suggest { query: String },
    /// Print the shareable query string for a search
    Share(SearchArgs),
    /// Run the search encoded in a shareable query string
    Open {
        /// Query string, with or without the leading '?'
        query: String,
    },
    /// List recipe categories
    Categories {
        /// Bypass the category cache
        #[arg(long)]
        refresh: bool,
    },
    /// Show one recipe
    Show { id: u64 },
    /// List ratings for a recipe
    Ratings {
        id: u64,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Rate a recipe from 1 to 5
    Rate {
        id: u64,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        score: u8,
        #[arg(long)]
        review: Option<String>,
    },
    /// Manage locally stored favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Toggle the favorite flag on the server
    Favorite { id: u64 },
}

#[derive(Subcommand)]
pub enum FavoritesAction {
    List,
    Add { id: u64 },
    Remove { id: u64 },
    Toggle { id: u64 },
    Clear,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SearchArgs {
    /// Free-text query
    #[arg(short, long)]
    pub query: Option<String>,
    /// Sort key, e.g. newest, rating, popularity
    #[arg(short, long)]
    pub ordering: Option<String>,
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub page_size: Option<u32>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub cuisine: Option<String>,
    #[arg(long)]
    pub cooking_method: Option<String>,
    /// Category slug (repeatable)
    #[arg(short, long = "category")]
    pub categories: Vec<String>,
    /// easy, medium or hard (repeatable)
    #[arg(long)]
    pub difficulty: Vec<String>,
    #[arg(long = "dietary")]
    pub dietary_restrictions: Vec<String>,
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,
    /// Ingredient that must appear (repeatable)
    #[arg(long = "with")]
    pub ingredients_include: Vec<String>,
    /// Ingredient that must not appear (repeatable)
    #[arg(long = "without")]
    pub ingredients_exclude: Vec<String>,
    #[arg(long)]
    pub min_prep_time: Option<u32>,
    #[arg(long)]
    pub max_prep_time: Option<u32>,
    #[arg(long)]
    pub min_cook_time: Option<u32>,
    #[arg(long)]
    pub max_cook_time: Option<u32>,
    #[arg(long)]
    pub min_servings: Option<u32>,
    #[arg(long)]
    pub max_servings: Option<u32>,
    #[arg(long)]
    pub min_rating: Option<f64>,
}

impl From<SearchArgs> for SearchParams {
    fn from(args: SearchArgs) -> Self {
        SearchParams {
            q: args.query,
            ordering: args.ordering,
            author: args.author,
            cuisine_type: args.cuisine,
            cooking_method: args.cooking_method,
            page: args.page,
            page_size: args.page_size,
            min_prep_time: args.min_prep_time,
            max_prep_time: args.max_prep_time,
            min_cook_time: args.min_cook_time,
            max_cook_time: args.max_cook_time,
            min_servings: args.min_servings,
            max_servings: args.max_servings,
            min_rating: args.min_rating,
            categories: Vec::new(),
            category_slugs: args.categories,
            difficulty: args.difficulty,
            dietary_restrictions: args.dietary_restrictions,
            tags: args.tags,
            ingredients_include: args.ingredients_include,
            ingredients_exclude: args.ingredients_exclude,
        }
    }
}
