//! Client-side routes of tournament pages

pub fn tournament_page(tournament_id: i64) -> String {
    format!("/to/{}", tournament_id)
}

pub fn tournament_register_page(tournament_id: i64) -> String {
    format!("/to/{}/register", tournament_id)
}

pub fn tournament_match_page(tournament_id: i64, match_id: i64) -> String {
    format!("/to/{}/matches/{}", tournament_id, match_id)
}

pub fn tournament_streams_page(tournament_id: i64) -> String {
    format!("/to/{}/streams", tournament_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_urls() {
        assert_eq!(tournament_page(5), "/to/5");
        assert_eq!(tournament_register_page(5), "/to/5/register");
        assert_eq!(tournament_match_page(5, 12), "/to/5/matches/12");
        assert_eq!(tournament_streams_page(5), "/to/5/streams");
    }
}
