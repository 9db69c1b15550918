use crate::errors::{CircuitError, CircuitResult};

fn check_size(size: usize) -> CircuitResult<()> {
    if size < 2 {
        Err(CircuitError::InvalidConfig(format!(
            "a line graph needs at least two vertices, got {}",
            size
        )))
    } else {
        Ok(())
    }
}

fn check_vertex(vertex: usize, size: usize) -> CircuitResult<()> {
    if vertex >= size {
        Err(CircuitError::VertexOutOfRange { vertex, size })
    } else {
        Ok(())
    }
}

/// Probability of stepping from vertex `i` to each vertex of a line graph with `size` vertices.
/// Endpoints have a single neighbor; interior vertices split evenly between theirs.
///
/// ```
/// use qwalk::walk::neighbor_probabilities;
/// assert_eq!(neighbor_probabilities(0, 4).unwrap(), vec![0.0, 1.0, 0.0, 0.0]);
/// assert_eq!(neighbor_probabilities(2, 4).unwrap(), vec![0.0, 0.5, 0.0, 0.5]);
/// assert_eq!(neighbor_probabilities(3, 4).unwrap(), vec![0.0, 0.0, 1.0, 0.0]);
/// ```
pub fn neighbor_probabilities(i: usize, size: usize) -> CircuitResult<Vec<f64>> {
    check_vertex(i, size)?;
    check_size(size)?;
    let mut prob = vec![0.0; size];
    if i == 0 {
        prob[1] = 1.0;
    } else if i == size - 1 {
        prob[size - 2] = 1.0;
    } else {
        prob[i - 1] = 0.5;
        prob[i + 1] = 0.5;
    }
    Ok(prob)
}

/// Whether `a` and `b` are joined by an edge of the line graph with `size` vertices.
pub fn is_edge(a: usize, b: usize, size: usize) -> CircuitResult<bool> {
    check_vertex(a, size)?;
    check_vertex(b, size)?;
    Ok(a.abs_diff(b) == 1)
}

/// Every ordered pair `(v, a)` of the line graph with `v - a = 1`, followed by every pair with
/// `v - a = -1`.
pub fn edge_pairs(size: usize) -> impl Iterator<Item = (usize, usize)> {
    let last = size.saturating_sub(1);
    let below = (0..last).map(|a| (a + 1, a));
    let above = (0..last).map(|v| (v, v + 1));
    below.chain(above)
}
