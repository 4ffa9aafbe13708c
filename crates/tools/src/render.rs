//! Plain-text rendering and summaries of a generated map.

use mazegen::{Cell, Connection, Coord, MapData};

pub const LEGEND: &str =
    "S start  E goal  k key room  o room  . passage  ' ' open  + closed  = locked  # wall";

/// Draws the maze on a `(2n+1)`-square character canvas: cells on odd
/// coordinates, connections between them, walls everywhere else.
pub fn render_ascii(map: &MapData) -> String {
    let width = map.side() * 2 + 1;
    let mut canvas = vec![vec!['#'; width]; width];

    for cell in map.topology().cells() {
        let y = cell.coord.row as usize * 2 + 1;
        let x = cell.coord.column as usize * 2 + 1;
        canvas[y][x] = cell_glyph(map, cell);
    }
    for ([a, b], connection) in map.edges() {
        let y = (a.row + b.row) as usize + 1;
        let x = (a.column + b.column) as usize + 1;
        canvas[y][x] = connection_glyph(connection);
    }

    canvas.into_iter().map(|row| row.into_iter().collect::<String>()).collect::<Vec<_>>().join("\n")
}

fn cell_glyph(map: &MapData, cell: &Cell) -> char {
    if cell.coord == map.start() {
        return 'S';
    }
    if cell.coord == map.end() {
        return 'E';
    }
    match cell.room() {
        Some(room) if room.keys().next().is_some() => 'k',
        Some(_) => 'o',
        None => '.',
    }
}

fn connection_glyph(connection: &Connection) -> char {
    if connection.is_locked() {
        '='
    } else if connection.is_open {
        ' '
    } else {
        '+'
    }
}

pub fn summary(map: &MapData) -> Vec<String> {
    let start = map.start();
    let end = map.end();
    vec![
        format!("Grid: {0}x{0}", map.side()),
        format!("Fingerprint: {:016x}", map.fingerprint()),
        format!("Start: {}, {}", coord_label(start), describe_cell(map, start)),
        format!("Goal: {}, {}", coord_label(end), describe_cell(map, end)),
        format!("Connections: {}", map.topology().connection_count()),
        format!("Locks: {}", map.locked_connections().count()),
        format!("Leaves: {}", map.leaves().len()),
        format!("Zones: {}", map.zone_count()),
    ]
}

/// One line per lock: what it is, where its key lies and who guards it.
pub fn chain_report(map: &MapData) -> Vec<String> {
    let mut lines = Vec::new();
    for id in map.locked_connections() {
        let (Some([a, b]), Some(connection)) = (map.endpoints(id), map.connection(id)) else {
            continue;
        };
        let Some(key) = connection.key() else { continue };
        let holder = match map.key_location(key) {
            Some(at) => {
                let guards: Vec<String> = map
                    .cell(at)
                    .and_then(Cell::room)
                    .map(|room| {
                        room.enemies
                            .iter()
                            .map(|enemy| {
                                format!("{} ({} hp)", enemy.name(), enemy.stats().max_health)
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                if guards.is_empty() {
                    format!("key at {}", coord_label(at))
                } else {
                    format!("key at {} guarded by {}", coord_label(at), guards.join(", "))
                }
            }
            None => "key is off the map".to_string(),
        };
        lines.push(format!(
            "{} {}-{} needs key {}: {holder}",
            connection.noun(),
            coord_label(a),
            coord_label(b),
            key.0
        ));
    }
    lines.sort();
    lines
}

pub fn describe_cell(map: &MapData, at: Coord) -> String {
    match map.cell(at) {
        Some(cell) => cell.surface.describe(cell.noun()),
        None => "nothing".to_string(),
    }
}

fn coord_label(at: Coord) -> String {
    format!("({}, {})", at.row, at.column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mazegen::generate_map;

    #[test]
    fn canvas_is_square_and_marks_start_and_goal_once() {
        let map = generate_map(3, 6).expect("generates");
        let drawing = render_ascii(&map);
        let rows: Vec<&str> = drawing.lines().collect();
        assert_eq!(rows.len(), 13);
        assert!(rows.iter().all(|row| row.chars().count() == 13));
        assert_eq!(drawing.matches('S').count(), 1);
        assert_eq!(drawing.matches('E').count(), 1);
        assert!(rows[0].chars().all(|glyph| glyph == '#'));
    }

    #[test]
    fn every_lock_is_drawn() {
        let map = generate_map(8, 7).expect("generates");
        let drawing = render_ascii(&map);
        assert_eq!(drawing.matches('=').count(), map.locked_connections().count());
    }

    #[test]
    fn chain_report_lists_every_lock_with_its_key() {
        let map = generate_map(12, 6).expect("generates");
        let report = chain_report(&map);
        assert_eq!(report.len(), map.locked_connections().count());
        assert!(report.iter().all(|line| line.contains("needs key") && line.contains("key at")));
    }

    #[test]
    fn summary_reports_spanning_tree_size() {
        let map = generate_map(1, 4).expect("generates");
        let lines = summary(&map);
        assert!(lines.contains(&"Connections: 15".to_string()));
        assert!(lines[0] == "Grid: 4x4");
    }
}
