use crate::domain::TVError;

/// Rows per page. Only a fixed set of sizes is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    Ten,
    Twenty,
    Thirty,
    Fifty,
}

impl PageSize {
    pub const ALL: [PageSize; 4] = [PageSize::Ten, PageSize::Twenty, PageSize::Thirty, PageSize::Fifty];

    pub fn get(self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Thirty => 30,
            PageSize::Fifty => 50,
        }
    }

    /// Next larger size, saturating at the largest.
    pub fn larger(self) -> Self {
        let pos = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(pos + 1).min(Self::ALL.len() - 1)]
    }

    /// Next smaller size, saturating at the smallest.
    pub fn smaller(self) -> Self {
        let pos = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[pos.saturating_sub(1)]
    }
}

impl TryFrom<usize> for PageSize {
    type Error = TVError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|s| s.get() == n)
            .ok_or(TVError::InvalidPageSize(n))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub visible: Vec<T>,
    pub total_pages: usize,
}

pub fn total_pages(len: usize, page_size: PageSize) -> usize {
    len.div_ceil(page_size.get())
}

/// Cuts page `page_index` out of `rows`. Indices past the end yield an empty
/// or short page instead of failing.
pub fn paginate<T: Clone>(rows: &[T], page_size: PageSize, page_index: usize) -> Page<T> {
    let size = page_size.get();
    let rbegin = page_index.saturating_mul(size).min(rows.len());
    let rend = rbegin.saturating_add(size).min(rows.len());
    Page {
        visible: rows[rbegin..rend].to_vec(),
        total_pages: total_pages(rows.len(), page_size),
    }
}

/// Largest valid page index for a page count.
pub fn last_index(total_pages: usize) -> usize {
    total_pages.saturating_sub(1)
}

pub fn clamp_index(page_index: usize, total_pages: usize) -> usize {
    page_index.min(last_index(total_pages))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Navigation {
    First,
    Prev,
    Next,
    Last,
    /// 1-based page number as typed by the user.
    JumpTo(i64),
}

/// New page index after a navigation step, always within `[0, total_pages-1]`
/// (or 0 when there are no pages).
pub fn navigate(nav: Navigation, current: usize, total_pages: usize) -> usize {
    let target = match nav {
        Navigation::First => 0,
        Navigation::Prev => current.saturating_sub(1),
        Navigation::Next => current.saturating_add(1),
        Navigation::Last => last_index(total_pages),
        Navigation::JumpTo(n) if n < 1 => 0,
        Navigation::JumpTo(n) => usize::try_from(n - 1).unwrap_or(usize::MAX),
    };
    clamp_index(target, total_pages)
}

/// Parses typed jump-to-page input. Anything that is not an integer is
/// rejected so it never reaches the page bounds.
pub fn parse_page_number(input: &str) -> Result<i64, TVError> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| TVError::InvalidPageNumber(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_five_rows_make_three_pages() {
        let rows: Vec<usize> = (0..25).collect();
        let first = paginate(&rows, PageSize::Ten, 0);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.visible.len(), 10);
        let last = paginate(&rows, PageSize::Ten, 2);
        assert_eq!(last.visible, (20..25).collect::<Vec<_>>());
        assert_eq!(navigate(Navigation::JumpTo(5), 0, 3), 2);
    }

    #[test]
    fn overrun_returns_empty_page() {
        let rows: Vec<usize> = (0..5).collect();
        let page = paginate(&rows, PageSize::Ten, 7);
        assert!(page.visible.is_empty());
        assert_eq!(page.total_pages, 1);
        let page = paginate(&rows, PageSize::Ten, usize::MAX);
        assert!(page.visible.is_empty());
    }

    #[test]
    fn empty_rows_have_no_pages() {
        let page = paginate::<usize>(&[], PageSize::Twenty, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.visible.is_empty());
        assert_eq!(navigate(Navigation::Last, 0, 0), 0);
        assert_eq!(navigate(Navigation::Next, 0, 0), 0);
    }

    #[test]
    fn navigation_is_clamped() {
        assert_eq!(navigate(Navigation::Prev, 0, 3), 0);
        assert_eq!(navigate(Navigation::Next, 2, 3), 2);
        assert_eq!(navigate(Navigation::Next, 1, 3), 2);
        assert_eq!(navigate(Navigation::First, 2, 3), 0);
        assert_eq!(navigate(Navigation::Last, 0, 3), 2);
        assert_eq!(navigate(Navigation::JumpTo(0), 2, 3), 0);
        assert_eq!(navigate(Navigation::JumpTo(-4), 2, 3), 0);
        assert_eq!(navigate(Navigation::JumpTo(2), 0, 3), 1);
    }

    #[test]
    fn every_row_lands_on_exactly_one_page() {
        for len in [0usize, 1, 9, 10, 11, 49, 50, 51, 137] {
            for size in PageSize::ALL {
                let rows: Vec<usize> = (0..len).collect();
                let pages = total_pages(len, size);
                let mut seen = Vec::new();
                for idx in 0..pages {
                    let page = paginate(&rows, size, idx);
                    if idx + 1 < pages {
                        assert_eq!(page.visible.len(), size.get());
                    }
                    seen.extend(page.visible);
                }
                assert_eq!(seen, rows);
            }
        }
    }

    #[test]
    fn page_numbers_must_be_numeric() {
        assert_eq!(parse_page_number(" 12 ").unwrap(), 12);
        assert!(matches!(
            parse_page_number("1a"),
            Err(TVError::InvalidPageNumber(_))
        ));
        assert!(parse_page_number("").is_err());
    }

    #[test]
    fn page_sizes() {
        assert_eq!(PageSize::try_from(30).unwrap(), PageSize::Thirty);
        assert!(PageSize::try_from(15).is_err());
        assert_eq!(PageSize::Fifty.larger(), PageSize::Fifty);
        assert_eq!(PageSize::Ten.smaller(), PageSize::Ten);
        assert_eq!(PageSize::Twenty.larger(), PageSize::Thirty);
    }
}
