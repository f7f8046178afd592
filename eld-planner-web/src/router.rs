use yew_router::prelude::*;

#[derive(Clone, Debug, Routable, PartialEq, Eq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/results")]
    Results,
    #[at("/history")]
    History,
    #[at("/404")]
    #[not_found]
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_resolve_to_pages() {
        assert_eq!(Route::recognize("/"), Some(Route::Home));
        assert_eq!(Route::recognize("/results"), Some(Route::Results));
        assert_eq!(Route::recognize("/history"), Some(Route::History));
        assert_eq!(Route::recognize("/nowhere"), Some(Route::NotFound));
        assert_eq!(Route::Results.to_path(), "/results");
    }
}
