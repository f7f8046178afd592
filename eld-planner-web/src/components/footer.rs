use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct Props {
    #[prop_or_default]
    pub year: Option<i32>,
}

#[function_component(Footer)]
pub fn footer(props: &Props) -> Html {
    let notice = props.year.map_or_else(
        || String::from("© ELD Trip Planner"),
        |year| format!("© {year} ELD Trip Planner"),
    );
    html! {
        <footer class="footer">
            <p>{ notice }</p>
            <p class="footer-note">{ "Hours-of-service planning for property-carrying drivers." }</p>
        </footer>
    }
}
