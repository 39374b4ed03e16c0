// tests/pipeline.rs
// Offline end-to-end runs over a seeded raw cache. The fixture is small
// enough to hand-compute: three districts, one Cyrillic alias, one missing
// rent row, one zero jobs count.

use std::fs;
use std::path::Path;

use tash_rank::config::{CityProfile, RunOptions};
use tash_rank::{run_pipeline, Error};

fn seed_cache(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join("raw_transport.csv"),
        "District,Transport_Score\nЮнусобод,8\nChilanzar,6\nSergeli,2\n",
    )
    .unwrap();
    fs::write(
        dir.join("raw_rent.csv"),
        "District,Rent_Price_USD\nYunusabad,650\nChilanzar,450\n",
    )
    .unwrap();
    fs::write(
        dir.join("raw_jobs.csv"),
        "District,Tech_Jobs_Count\nYunusabad,120\nChilanzar,80\nSergeli,0\n",
    )
    .unwrap();
    fs::write(
        dir.join("raw_pois.csv"),
        "District,Cultural_POI_Count\nYunusabad,60\nChilanzar,40\nSergeli,20\n",
    )
    .unwrap();
}

fn offline_options(root: &Path) -> RunOptions {
    RunOptions {
        cache_dir: root.join("raw"),
        out_dir: root.join("out"),
        offline: true,
        ..RunOptions::default()
    }
}

#[test]
fn offline_run_ranks_the_seeded_cache() {
    let tmp = tempfile::tempdir().unwrap();
    let options = offline_options(tmp.path());
    seed_cache(&options.cache_dir);

    let ranked = run_pipeline(&CityProfile::default(), &options, None).unwrap();

    // Yunusabad leads on everything but affordability; Sergeli trails.
    let top = ranked.top(3);
    let names: Vec<&str> = top.iter().map(|(d, _, _)| *d).collect();
    assert_eq!(names, ["Yunusabad", "Chilanzar", "Sergeli"]);
    assert_eq!(top[0].1, 7.5);
    assert_eq!(top[2].1, 2.5);

    // Raw rents ride along: Sergeli's was never scraped and got the
    // interpolated median of the other two.
    assert_eq!(top[0].2, 650.0);
    assert_eq!(top[2].2, 550.0);

    let cleaned = fs::read_to_string(options.cleaned_path()).unwrap();
    let mut lines = cleaned.lines();
    assert_eq!(
        lines.next().unwrap(),
        "District,Transport_Score,Rent_Price_USD,Tech_Jobs_Count,Cultural_POI_Count,\
         Transport_Score_Norm,Rent_Price_USD_Norm,Tech_Jobs_Count_Norm,Cultural_POI_Count_Norm,\
         Rent_Affordability_Norm"
    );
    // The alias collapsed: transport's Cyrillic row carries the Latin name.
    assert!(lines.next().unwrap().starts_with("Yunusabad,8,650,120,60,"));

    let rankings = fs::read_to_string(options.rankings_path()).unwrap();
    let mut lines = rankings.lines();
    assert!(lines.next().unwrap().ends_with(
        "Rent_Affordability_Norm,Score_Transport,Score_Jobs,Score_POI,Score_Rent,Composite_Score"
    ));
    assert!(lines.next().unwrap().starts_with("Yunusabad,"));

    // Sergeli's zero office count was reclassified as missing and filled
    // with the median of the two live counts.
    let sergeli = rankings.lines().find(|l| l.starts_with("Sergeli,")).unwrap();
    assert!(sergeli.starts_with("Sergeli,2,550,100,20,"));
}

#[test]
fn scrub_is_deterministic() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = tmp.path().join("raw");
    seed_cache(&cache);

    let run = |out: &str| {
        let options = RunOptions {
            cache_dir: cache.clone(),
            out_dir: tmp.path().join(out),
            offline: true,
            ..RunOptions::default()
        };
        run_pipeline(&CityProfile::default(), &options, None).unwrap();
        (
            fs::read(options.cleaned_path()).unwrap(),
            fs::read(options.rankings_path()).unwrap(),
        )
    };

    let first = run("out1");
    let second = run("out2");
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
}

#[test]
fn offline_with_a_cold_cache_refuses() {
    let tmp = tempfile::tempdir().unwrap();
    let options = offline_options(tmp.path());
    fs::create_dir_all(&options.cache_dir).unwrap();

    let err = run_pipeline(&CityProfile::default(), &options, None).unwrap_err();
    assert!(matches!(err, Error::NoRawData(_)));
}

#[test]
fn damaged_raw_table_drops_out_instead_of_aborting() {
    let tmp = tempfile::tempdir().unwrap();
    let options = offline_options(tmp.path());
    seed_cache(&options.cache_dir);
    fs::write(
        options.cache_dir.join("raw_transport.csv"),
        "District;Transport_Score\ngarbage",
    )
    .unwrap();

    let ranked = run_pipeline(&CityProfile::default(), &options, None).unwrap();

    // Three districts survive via the other tables; the transport column
    // had no values anywhere, so it imputed flat zero for everyone.
    assert_eq!(ranked.rows.len(), 3);
    for row in &ranked.rows {
        assert_eq!(row.clean.values[0], 0.0);
        assert!(row.composite.is_finite());
    }
}

#[test]
fn non_finite_cache_cells_demote_the_table() {
    let tmp = tempfile::tempdir().unwrap();
    let options = offline_options(tmp.path());
    seed_cache(&options.cache_dir);
    // One NaN cell cannot be imputed around; the whole table reads as
    // malformed and drops out, same as the garbled one above.
    fs::write(
        options.cache_dir.join("raw_transport.csv"),
        "District,Transport_Score\nЮнусобод,NaN\nChilanzar,6\nSergeli,2\n",
    )
    .unwrap();

    let ranked = run_pipeline(&CityProfile::default(), &options, None).unwrap();

    assert_eq!(ranked.rows.len(), 3);
    for row in &ranked.rows {
        assert_eq!(row.clean.values[0], 0.0);
        assert!(row.clean.norms.iter().all(|n| n.is_finite()));
        assert!(row.composite.is_finite());
    }

    // Nothing non-finite leaks into the written artifacts either.
    let cleaned = fs::read_to_string(options.cleaned_path()).unwrap();
    let rankings = fs::read_to_string(options.rankings_path()).unwrap();
    assert!(!cleaned.contains("NaN") && !cleaned.contains("inf"));
    assert!(!rankings.contains("NaN") && !rankings.contains("inf"));
}
