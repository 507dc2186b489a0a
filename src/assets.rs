use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "./assets"]
#[include = "default-config.json"]
#[include = "pages/*"]
pub struct Assets;

/// Embedded default `config.json`
pub fn get_default_config() -> Option<String> {
    Assets::get("default-config.json")
        .map(|file| String::from_utf8_lossy(&file.data).into_owned())
}

/// All embedded page files as `(file name, contents)`
pub fn get_embedded_pages() -> Vec<(String, Vec<u8>)> {
    Assets::iter()
        .filter_map(|path| {
            let name = path.strip_prefix("pages/")?.to_string();
            let file = Assets::get(&path)?;
            Some((name, file.data.into_owned()))
        })
        .collect()
}
