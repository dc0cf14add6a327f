/// computes n choose k with the additive recurrence of pascal's triangle,
/// keeping a single row of at most k + 1 entries.
/// returns None if an intermediate entry would overflow a u64.
pub fn binomial(n: usize, k: usize) -> Option<u64> {
    if k > n {
        return Some(0);
    }

    let mut row = vec![0u64; k + 1];
    row[0] = 1;
    for i in 1..=n {
        // walk right to left so row[j - 1] still holds the previous row's value
        for j in (1..=k.min(i)).rev() {
            row[j] = row[j].checked_add(row[j - 1])?;
        }
    }

    Some(row[k])
}

/// the number of other tickets that any single ticket can cover before anything is selected.
/// identical for every ticket by symmetry: a ticket sharing exactly `shared` numbers with a given
/// ticket picks those from the ticket and the rest from the numbers outside of it.
///
/// this closed form (Jans & Degraeve, 2008) lets graph construction skip a pairwise scan.
pub fn initial_coverage_potential(
    range: usize,
    ticket_size: usize,
    match_size: usize,
) -> Option<u64> {
    let outside_count = range.checked_sub(ticket_size)?;

    let mut potential: u64 = 0;
    for shared in match_size..ticket_size {
        let term = binomial(ticket_size, shared)?
            .checked_mul(binomial(outside_count, ticket_size - shared)?)?;
        potential = potential.checked_add(term)?;
    }

    Some(potential)
}
