//! Reference data loaded once at startup: both movie pools and the prompt templates.

use crate::types::{LocalMovie, TitleEntry};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;

/// Placeholder substituted for the movie title in prompt templates
pub const TITLE_PLACEHOLDER: &str = "{title}";

/// Stylistic prompts for the generative rounds
pub const PROMPT_TEMPLATES: &[&str] = &[
    "Em uma única e concisa frase, descreva o objetivo principal do protagonista de '{title}' e o maior obstáculo em seu caminho. Não use nomes de personagens ou lugares.",
    "Resuma a trama de '{title}' como se fosse uma reclamação postada em uma rede social sobre um inconveniente. Não mencione nomes ou o título do filme.",
    "Resuma '{title}' em uma frase, focando na pior decisão tomada pelo protagonista que inicia toda a confusão. Não mencione nomes.",
    "Como um personagem secundário totalmente confuso descreveria os eventos de '{title}' em uma ou duas frases curtas? Foque na confusão dele. Não mencione nomes.",
    "Classifique o filme '{title}' com um gênero comicamente errado e justifique o porquê em uma única frase. Exemplo: 'É uma comédia romântica sobre um homem e seu barco'. Não use nomes.",
    "Resuma a trama de '{title}' do ponto de vista do vilão, que acredita genuinamente ser o herói incompreendido da história. Mantenha em uma ou duas frases e não use nomes.",
    "Resuma a premissa de '{title}' da forma mais burocrática e sem emoção possível, como se fosse um relatório de incidente para uma seguradora. Máximo de duas frases. Não use nomes.",
    "Descreva o problema central de '{title}' como uma avaliação de 1 estrela para um serviço, produto ou local. Exemplo: 'Péssimo serviço de cruzeiro, bateu num iceberg'. Responda em uma frase e não use nomes.",
];

/// Errors that can occur while reading a catalog file
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} contains no movies")]
    Empty(String),
}

/// Immutable movie pools shared by every session
#[derive(Debug, Clone)]
pub struct Catalog {
    pub local_movies: Vec<LocalMovie>,
    pub ia_titles: Vec<TitleEntry>,
    pub prompt_templates: Vec<String>,
}

impl Catalog {
    /// Build a catalog from in-memory pools. Empty pools are replaced by the fallbacks.
    pub fn new(local_movies: Vec<LocalMovie>, ia_titles: Vec<TitleEntry>) -> Self {
        let local_movies = if local_movies.is_empty() {
            fallback_local_movies()
        } else {
            dedup_local(local_movies)
        };
        let ia_titles = if ia_titles.is_empty() {
            fallback_ia_titles()
        } else {
            dedup_titles(ia_titles)
        };

        Self {
            local_movies,
            ia_titles,
            prompt_templates: PROMPT_TEMPLATES.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Load both pools from disk; a missing or broken file degrades to its fallback pool
    pub fn load(movies_path: &Path, titles_path: &Path) -> Self {
        let local_movies = read_pool::<LocalMovie>(movies_path).unwrap_or_else(|e| {
            tracing::warn!("Static movie pool unavailable ({}), using fallback", e);
            Vec::new()
        });
        let ia_titles = read_pool::<TitleEntry>(titles_path).unwrap_or_else(|e| {
            tracing::warn!("Generative title pool unavailable ({}), using fallback", e);
            Vec::new()
        });

        let catalog = Self::new(local_movies, ia_titles);
        tracing::info!(
            local_movies = catalog.local_movies.len(),
            ia_titles = catalog.ia_titles.len(),
            "Catalog loaded"
        );
        catalog
    }
}

/// Read a JSON array of entries from disk
pub fn read_pool<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CatalogError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: display.clone(),
        source,
    })?;
    let entries: Vec<T> = serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
        path: display.clone(),
        source,
    })?;

    if entries.is_empty() {
        return Err(CatalogError::Empty(display));
    }
    Ok(entries)
}

fn fallback_local_movies() -> Vec<LocalMovie> {
    vec![LocalMovie {
        title: "Erro".to_string(),
        synopsis: "Arquivo movies.json não encontrado.".to_string(),
    }]
}

fn fallback_ia_titles() -> Vec<TitleEntry> {
    vec![TitleEntry {
        display_title: "Matrix".to_string(),
        aliases: vec!["Matrix".to_string()],
    }]
}

/// Keep one entry per key, the last occurrence winning, in first-seen order
fn dedup_by_key<T, F>(entries: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> String,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<T> = Vec::with_capacity(entries.len());

    for entry in entries {
        let k = key(&entry);
        match index.get(&k) {
            Some(&pos) => out[pos] = entry,
            None => {
                index.insert(k, out.len());
                out.push(entry);
            }
        }
    }

    out
}

fn dedup_local(movies: Vec<LocalMovie>) -> Vec<LocalMovie> {
    let before = movies.len();
    let out = dedup_by_key(movies, |m| m.title.clone());
    if out.len() < before {
        tracing::info!("Removed {} duplicate static movies", before - out.len());
    }
    out
}

fn dedup_titles(titles: Vec<TitleEntry>) -> Vec<TitleEntry> {
    let before = titles.len();
    let out: Vec<TitleEntry> = dedup_by_key(titles, |t| t.display_title.clone())
        .into_iter()
        .map(|mut t| {
            if t.aliases.is_empty() {
                t.aliases.push(t.display_title.clone());
            }
            t
        })
        .collect();
    if out.len() < before {
        tracing::info!("Removed {} duplicate generative titles", before - out.len());
    }
    out
}
