//! Index generation through repository lookup to rendered HTML.

use quill_core::{
    render_post, write_index, Config, ContentRepository, IndexBuilder, IndexSource,
    MarkdownProcessor,
};
use quill_types::ContentIndex;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn precomputed_index_drives_listing_and_rendering() {
    let dir = tempdir().unwrap();
    let config = Config::with_root(dir.path());
    let corpus = config.corpus_dir();

    write(
        &corpus,
        "home/Rust 笔记.md",
        "---\nslug: rust-notes\ntitle: Rust 笔记\ndate: 2024/03/10\ntags: [Rust]\n---\n学习Rust的笔记",
    );
    write(
        &corpus,
        "home/intro.md",
        "---\nslug: intro\ntitle: Intro\ndate: 2024-01-01\nkeywords: a, b\n---\n\
第一段text\n参考[[Rust 笔记|笔记]]与[[Unknown]]\n![[cover|640]]\n结束",
    );
    write(&corpus, "daily/2024-05-01.md", "---\nslug: d-0501\ndate: 2024-05-01\n---\n日记");

    let report = IndexBuilder::new(&corpus).build().unwrap();
    assert_eq!(report.entries.len(), 3);
    write_index(&config.index_path(), &ContentIndex::new(report.entries)).unwrap();

    let repo = ContentRepository::from_config(&config);
    assert_eq!(repo.snapshot().unwrap().source(), IndexSource::Artifact);

    let posts = repo.sorted_posts().unwrap();
    let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["rust-notes", "intro"]);
    assert_eq!(posts[0].tags, vec!["rust"]);
    assert_eq!(repo.all_daily_slugs().unwrap(), vec!["d-0501"]);

    let processor = MarkdownProcessor::from_config(&config);
    let page = render_post(&repo, &processor, "intro", Some("en"))
        .unwrap()
        .unwrap();

    assert_eq!(page.post.summary.keywords, vec!["a", "b"]);
    assert_eq!(page.unresolved_links, 1);
    assert_eq!(
        page.html,
        concat!(
            "<p>第一段 text</p>\n",
            "<p>参考 <a href=\"/en/posts/rust-notes\">笔记</a> 与 ",
            "<a href=\"#\" title=\"Unresolved wiki link\" aria-disabled=\"true\" data-unresolved=\"true\">Unknown</a></p>\n",
            "<img src=\"/image/cover.png\" alt=\"cover\" title=\"cover\" width=\"640\" />\n",
            "<p>结束</p>\n",
        )
    );
}

#[test]
fn renamed_slug_is_not_found_until_reindexed() {
    let dir = tempdir().unwrap();
    let config = Config::with_root(dir.path());
    let corpus = config.corpus_dir();
    write(&corpus, "home/a.md", "---\nslug: old\ndate: 2024-01-01\n---\nbody");

    let report = IndexBuilder::new(&corpus).build().unwrap();
    write_index(&config.index_path(), &ContentIndex::new(report.entries)).unwrap();

    write(&corpus, "home/a.md", "---\nslug: new\ndate: 2024-01-01\n---\nbody");

    let repo = ContentRepository::from_config(&config);
    assert!(repo.post_by_slug("old").unwrap().is_none());
    assert!(repo.post_by_slug("new").unwrap().is_none());

    let report = IndexBuilder::new(&corpus).build().unwrap();
    write_index(&config.index_path(), &ContentIndex::new(report.entries)).unwrap();
    repo.invalidate();

    let post = repo.post_by_slug("new").unwrap().unwrap();
    assert_eq!(post.content, "body");
}
