use std::collections::HashMap;

/// Split text into lowercase word tokens
///
/// Runs of letters and digits are words. CJK text carries no spaces, so
/// every CJK run is broken into overlapping character bigrams instead.
/// Single-character tokens are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut tokens = Vec::new();
    let mut latin = String::new();
    let mut cjk: Vec<char> = Vec::new();

    for ch in lower.chars() {
        if is_cjk(ch) {
            flush_word(&mut latin, &mut tokens);
            cjk.push(ch);
        } else if ch.is_alphanumeric() {
            flush_cjk(&mut cjk, &mut tokens);
            latin.push(ch);
        } else {
            flush_word(&mut latin, &mut tokens);
            flush_cjk(&mut cjk, &mut tokens);
        }
    }
    flush_word(&mut latin, &mut tokens);
    flush_cjk(&mut cjk, &mut tokens);

    tokens
}

fn flush_word(word: &mut String, tokens: &mut Vec<String>) {
    if word.chars().count() >= 2 {
        tokens.push(std::mem::take(word));
    } else {
        word.clear();
    }
}

fn flush_cjk(run: &mut Vec<char>, tokens: &mut Vec<String>) {
    tokens.extend(run.windows(2).map(|pair| pair.iter().collect::<String>()));
    run.clear();
}

#[inline]
fn is_cjk(ch: char) -> bool {
    matches!(ch,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2A6DF}')
}

/// Unigram and bigram terms of a token stream
fn terms(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let bigrams = tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1]));
    tokens.iter().cloned().chain(bigrams).collect()
}

/// TF-IDF model over a fixed vocabulary
#[derive(Debug, Clone)]
pub struct TfidfModel {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfModel {
    /// Fit on a corpus, keeping the `max_features` most frequent terms
    ///
    /// Returns `None` when the corpus yields no terms at all.
    pub fn fit(documents: &[String], max_features: usize) -> Option<Self> {
        let doc_terms: Vec<Vec<String>> = documents.iter().map(|d| terms(d)).collect();

        let mut frequency: HashMap<&str, usize> = HashMap::new();
        let mut doc_frequency: HashMap<&str, usize> = HashMap::new();
        for doc in &doc_terms {
            for term in doc {
                *frequency.entry(term.as_str()).or_insert(0) += 1;
            }
            let mut seen: Vec<&str> = doc.iter().map(String::as_str).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *doc_frequency.entry(term).or_insert(0) += 1;
            }
        }

        if frequency.is_empty() {
            return None;
        }

        let mut ranked: Vec<(&str, usize)> = frequency.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);
        // Column order is alphabetical over the kept terms
        ranked.sort_by(|a, b| a.0.cmp(&b.0));

        let n_docs = documents.len() as f64;
        let idf = ranked
            .iter()
            .map(|(term, _)| {
                let df = doc_frequency.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        let vocabulary = ranked
            .into_iter()
            .enumerate()
            .map(|(i, (term, _))| (term.to_string(), i))
            .collect();

        Some(Self { vocabulary, idf })
    }

    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }

    /// L2-normalized TF-IDF vector; all zeros when no term is known
    pub fn transform(&self, text: &str) -> Vec<f64> {
        let mut vector = vec![0.0; self.idf.len()];
        for term in terms(text) {
            if let Some(&col) = self.vocabulary.get(&term) {
                vector[col] += 1.0;
            }
        }

        for (value, idf) in vector.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in vector.iter_mut() {
                *value /= norm;
            }
        }
        vector
    }
}

/// Cosine similarity; zero when either vector is zero
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
