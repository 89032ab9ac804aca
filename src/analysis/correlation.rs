//! Pearson correlation between the quantitative venue columns.

use crate::models::{CorrelationMatrix, Venue};

pub(crate) type Column = (&'static str, fn(&Venue) -> Option<f64>);

/// Quantitative columns included in the matrix.
pub(crate) const COLUMNS: [Column; 9] = [
    ("Commune population (2015)", |v: &Venue| v.commune_population.map(|x| x as f64)),
    ("Urban unit population (2015)", |v: &Venue| v.urban_unit_population.map(|x| x as f64)),
    ("Screens", |v: &Venue| v.screens.map(|x| x as f64)),
    ("Seats", |v: &Venue| v.seats.map(|x| x as f64)),
    ("Sessions 2020", |v: &Venue| v.sessions_2020.map(|x| x as f64)),
    ("Admissions 2020", |v: &Venue| v.admissions_2020.map(|x| x as f64)),
    ("Admissions 2019", |v: &Venue| v.admissions_2019.map(|x| x as f64)),
    ("Films 2020", |v: &Venue| v.films_2020.map(|x| x as f64)),
    ("New films 2020", |v: &Venue| v.new_films_2020.map(|x| x as f64)),
];

/// Compute the correlation matrix over pairwise-complete observations.
pub fn correlation_matrix(venues: &[Venue]) -> CorrelationMatrix {
    let columns: Vec<Vec<Option<f64>>> = COLUMNS
        .iter()
        .map(|&(_, get)| venues.iter().map(get).collect())
        .collect();

    let values = columns
        .iter()
        .map(|a| columns.iter().map(|b| pearson(a, b)).collect())
        .collect();

    CorrelationMatrix {
        columns: COLUMNS.iter().map(|(name, _)| name.to_string()).collect(),
        values,
    }
}

/// Pearson coefficient over the rows where both values are present.
///
/// `None` with fewer than two pairs or a zero variance.
fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(screens: Option<u64>, seats: Option<u64>, sessions: Option<u64>) -> Venue {
        Venue {
            screens,
            seats,
            sessions_2020: sessions,
            ..Venue::default()
        }
    }

    fn cell(matrix: &CorrelationMatrix, a: &str, b: &str) -> Option<f64> {
        let i = matrix.columns.iter().position(|c| c == a).unwrap();
        let j = matrix.columns.iter().position(|c| c == b).unwrap();
        matrix.values[i][j]
    }

    #[test]
    fn test_perfect_positive_correlation() {
        let venues = vec![
            venue(Some(1), Some(100), None),
            venue(Some(2), Some(200), None),
            venue(Some(3), Some(300), None),
        ];

        let matrix = correlation_matrix(&venues);
        let r = cell(&matrix, "Screens", "Seats").unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_correlation() {
        let venues = vec![
            venue(Some(1), None, Some(30)),
            venue(Some(2), None, Some(20)),
            venue(Some(3), None, Some(10)),
        ];

        let matrix = correlation_matrix(&venues);
        let r = cell(&matrix, "Screens", "Sessions 2020").unwrap();
        assert!((r + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pairwise_complete_observations() {
        let venues = vec![
            venue(Some(1), Some(10), None),
            venue(Some(2), None, None),
            venue(Some(3), Some(30), None),
        ];

        let matrix = correlation_matrix(&venues);
        let r = cell(&matrix, "Screens", "Seats").unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_undefined_cells() {
        let venues = vec![venue(Some(2), Some(10), None), venue(Some(2), Some(20), None)];

        let matrix = correlation_matrix(&venues);
        assert_eq!(cell(&matrix, "Screens", "Seats"), None);
        assert_eq!(cell(&matrix, "Sessions 2020", "Seats"), None);
    }

    #[test]
    fn test_matrix_shape() {
        let matrix = correlation_matrix(&[]);
        assert_eq!(matrix.columns.len(), COLUMNS.len());
        assert_eq!(matrix.values.len(), COLUMNS.len());
        assert!(matrix.values.iter().all(|row| row.len() == COLUMNS.len()));
    }
}
