use rayon::prelude::*;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::error::{ScrubError, ScrubResult};
use crate::tokenizer::Tokenize;

/// One row of the song metadata table.
#[derive(Debug, Clone, Deserialize)]
pub struct SongMeta {
    pub song_id: String,
    pub song_name: String,
    #[serde(deserialize_with = "deserialize_flag")]
    pub explicit: bool,
}

/// One row of the lyrics table. An empty lyrics cell is `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct LyricsRow {
    pub song_id: String,
    pub lyrics: Option<String>,
}

/// A metadata row joined with its lyrics.
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub song_id: String,
    /// Lowercased title
    pub song_name: String,
    pub explicit: bool,
    pub lyrics: Option<String>,
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" | "yes" => Ok(true),
        "false" | "0" | "0.0" | "no" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean explicit flag, found '{}'",
            other
        ))),
    }
}

fn read_tsv<T: DeserializeOwned>(path: &Path) -> ScrubResult<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)?;

    let rows = reader.deserialize().collect::<Result<Vec<T>, csv::Error>>()?;
    debug!(path = %path.display(), rows = rows.len(), "read table");
    Ok(rows)
}

/// Load both tables and inner-join them on `song_id`, keeping metadata row
/// order. Metadata rows without any lyrics row are dropped.
pub fn load_songs(metadata: &Path, lyrics: &Path) -> ScrubResult<Vec<Song>> {
    let meta: Vec<SongMeta> = read_tsv(metadata)?;
    let lyrics: Vec<LyricsRow> = read_tsv(lyrics)?;
    Ok(join(meta, lyrics))
}

/// Inner join; a song id with several lyrics rows yields one song per row.
pub fn join(meta: Vec<SongMeta>, lyrics: Vec<LyricsRow>) -> Vec<Song> {
    let mut by_id: HashMap<String, Vec<Option<String>>> = HashMap::new();
    for row in lyrics {
        by_id.entry(row.song_id).or_default().push(row.lyrics);
    }

    let mut songs = Vec::with_capacity(meta.len());
    for row in meta {
        let Some(matches) = by_id.get(&row.song_id) else {
            continue;
        };
        let song_name = row.song_name.to_lowercase();
        for lyrics in matches {
            songs.push(Song {
                song_id: row.song_id.clone(),
                song_name: song_name.clone(),
                explicit: row.explicit,
                lyrics: lyrics.clone(),
            });
        }
    }
    songs
}

fn bracket_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[.*?\]").expect("valid regex"))
}

fn escaped_newlines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // runs of the two-char sequence `\n`, not a backslash followed by many n's
    RE.get_or_init(|| Regex::new(r"(?:\\n)+").expect("valid regex"))
}

/// Strip the list-literal brackets, section annotations ("[Chorus]") and
/// escaped newlines from raw lyrics, then lowercase and tokenize.
pub fn preprocess_lyrics(raw: &str, tokenizer: &dyn Tokenize) -> Vec<String> {
    let text = raw
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_lowercase();
    let text = bracket_re().replace_all(&text, "");
    let text = escaped_newlines_re().replace_all(&text, " ");
    let text = text.replace('\\', "");
    tokenizer.tokenize(&text)
}

/// Tokenize every song that has lyrics, in parallel, keeping input order.
/// Songs with missing lyrics are skipped.
pub fn tokenize_songs<T>(songs: &[Song], tokenizer: &T) -> Vec<(Vec<String>, bool)>
where
    T: Tokenize + Sync,
{
    let skipped = songs.iter().filter(|s| s.lyrics.is_none()).count();
    if skipped > 0 {
        warn!(skipped, "songs without lyrics left out of training");
    }

    songs
        .par_iter()
        .filter_map(|song| {
            let lyrics = song.lyrics.as_deref()?;
            Some((preprocess_lyrics(lyrics, tokenizer), song.explicit))
        })
        .collect()
}

/// Tokenized lyrics of the single song titled `title` (case-insensitive).
pub fn find_song(songs: &[Song], title: &str, tokenizer: &dyn Tokenize) -> ScrubResult<Vec<String>> {
    let wanted = title.to_lowercase();
    let matches: Vec<&Song> = songs.iter().filter(|s| s.song_name == wanted).collect();

    match matches.as_slice() {
        [song] => match song.lyrics.as_deref() {
            Some(lyrics) => Ok(preprocess_lyrics(lyrics, tokenizer)),
            None => Err(ScrubError::MissingLyrics(title.to_string())),
        },
        _ => Err(ScrubError::SongNotFound {
            title: title.to_string(),
            matches: matches.len(),
        }),
    }
}

/// Read a `.txt` file line by line, lowercase it and tokenize it. The file
/// must yield at least one token.
pub fn read_text(path: &Path, tokenizer: &dyn Tokenize) -> ScrubResult<Vec<String>> {
    let is_txt = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
    if !is_txt {
        return Err(ScrubError::NotTextFile(path.display().to_string()));
    }

    let reader = BufReader::new(File::open(path)?);
    let mut tokens = Vec::new();
    for line in reader.lines() {
        tokens.extend(tokenizer.tokenize(&line?.to_lowercase()));
    }

    if tokens.is_empty() {
        return Err(ScrubError::EmptyText(path.display().to_string()));
    }
    Ok(tokens)
}
