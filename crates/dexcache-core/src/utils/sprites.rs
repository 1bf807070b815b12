/// Base URL for official artwork sprites, addressed by id.
const ARTWORK_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork/";

/// Official artwork URL derived from the id alone.
pub fn artwork_url(id: u32) -> String {
    format!("{}{}.png", ARTWORK_BASE_URL, id)
}
