use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use wordnet_morphy::{Lemmatizer, Morphy, Pos, WordNetLemmatizer};

const USAGE: &str =
    "usage: cargo run -p wordnet-morphy --example lookup -- <dict-dir> [--demo | <word>]";

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let dict_dir = args.next().map(PathBuf::from).context(USAGE)?;
    let words: Vec<String> = match args.next().as_deref() {
        Some("--demo") => ["villages", "children", "mills", "colonies", "sectors"]
            .into_iter()
            .map(String::from)
            .collect(),
        Some(word) => vec![word.to_string()],
        None => bail!(USAGE),
    };
    if args.next().is_some() {
        bail!("too many arguments");
    }

    let lemmatizer = WordNetLemmatizer::load(&dict_dir)?;
    let morph = Morphy::load(&dict_dir)?;
    println!("Dictionary: {}", dict_dir.display());

    for word in words {
        println!("\n{word} -> {}", lemmatizer.lemmatize(&word));
        let candidates = morph.lemmas_for(Pos::Noun, &word, |p, lemma| {
            lemmatizer.lexicon().lemma_exists(p, lemma)
        });
        for cand in candidates {
            println!("    {:<12} [{:?}]", cand.lemma, cand.source);
        }
    }

    Ok(())
}
