use std::fs;
use std::path::Path;
use taxo_core::graph::EdgeIndex;
use taxo_core::tables::{Table, TableError, TableWriter, read_edges, read_labels};

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_edges_feed_index() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write(
        tmp.path(),
        "skill_hierarchy.csv",
        "PARENTID,CHILDID\nA,B\nA,C\nB,D\nC,D\nB,D\n",
    );
    let index = EdgeIndex::from_edges(read_edges(&path, "CHILDID", "PARENTID").unwrap());
    assert_eq!(index.edge_count(), 4);
    assert_eq!(index.parents("D").unwrap().len(), 2);
}

#[test]
fn test_labels_merge_groups_over_skills() {
    let tmp = tempfile::tempdir().unwrap();
    let skills = write(
        tmp.path(),
        "skills.csv",
        "ID,PREFERREDLABEL,SKILLTYPE\ns1,manage staff,skill\nshared,old label,skill\n",
    );
    let groups = write(
        tmp.path(),
        "skill_groups.csv",
        "ID,PREFERREDLABEL\ng1,management\nshared,new label\n",
    );

    let mut labels = read_labels(&skills, "ID", "PREFERREDLABEL").unwrap();
    labels.merge(read_labels(&groups, "ID", "PREFERREDLABEL").unwrap());

    assert_eq!(labels.label("s1"), "manage staff");
    assert_eq!(labels.label("g1"), "management");
    assert_eq!(labels.label("shared"), "new label");
}

#[test]
fn test_nonexistent_file_is_read_error() {
    let tmp = tempfile::tempdir().unwrap();
    let err = Table::read(&tmp.path().join("missing.csv")).unwrap_err();
    assert!(matches!(err, TableError::Read { .. }));
}

#[test]
fn test_write_then_read_back() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("skills_with_levels.csv");
    let mut writer = TableWriter::create(&path, ["ID", "PREFERREDLABEL", "LEVEL"]).unwrap();
    writer.write_row(["s1", "label, with comma", "3"]).unwrap();
    writer.finish().unwrap();

    let table = Table::read(&path).unwrap();
    assert_eq!(table.len(), 1);
    let label = table.column("PREFERREDLABEL").unwrap();
    assert_eq!(table.require(&table.records()[0], label).unwrap(), "label, with comma");
    assert!(table.find_column("missing").is_none());
}
