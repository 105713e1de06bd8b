//! Paging through long lists of expenses.

use maud::{Markup, html};

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum expenses to display per page when not specified in a request.
    pub default_page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 20,
            max_pages: 5,
        }
    }
}

/// One entry of the page navigation.
#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

/// The number of pages needed for `item_count` items, at least one.
pub fn page_count(item_count: usize, page_size: u64) -> u64 {
    (item_count as u64).div_ceil(page_size.max(1)).max(1)
}

/// The items on page `page` (counting from 1), clamped to the last page.
pub fn page_slice<T>(items: &[T], page: u64, page_size: u64) -> &[T] {
    let page_size = page_size.max(1) as usize;
    let page = page.clamp(1, page_count(items.len(), page_size as u64)) as usize;
    let start = ((page - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());

    &items[start..end]
}

/// Work out which page links to show for `curr_page` out of `page_count`.
///
/// At most `max_pages` consecutive pages are shown around the current page,
/// with the first and last page and ellipses added when pages are skipped.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let half = max_pages / 2;
    let map_page = |page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    };

    let window = if page_count <= max_pages {
        1..=page_count
    } else if curr_page <= half {
        1..=max_pages
    } else if curr_page > page_count - half {
        (page_count - max_pages + 1)..=page_count
    } else {
        (curr_page - half)..=(curr_page + half)
    };

    let mut indicators: Vec<_> = window.map(map_page).collect();

    if page_count > max_pages {
        if curr_page > half + 1 {
            indicators.splice(
                0..0,
                [PaginationIndicator::Page(1), PaginationIndicator::Ellipsis],
            );
        }

        if curr_page < page_count - half {
            indicators.extend([
                PaginationIndicator::Ellipsis,
                PaginationIndicator::Page(page_count),
            ]);
        }
    }

    if curr_page > 1 {
        indicators.insert(0, PaginationIndicator::BackButton(curr_page - 1));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

/// Render the page navigation, linking each page to `page_url(page)`.
pub fn pagination_view(
    indicators: &[PaginationIndicator],
    page_url: impl Fn(u64) -> String,
) -> Markup {
    const PAGE_LINK: &str = "block min-w-9 rounded-md px-3 py-1.5 text-center text-sky-700 \
        hover:bg-sky-100 dark:text-sky-300 dark:hover:bg-gray-700";
    const CURRENT_PAGE: &str = "block min-w-9 rounded-md bg-sky-600 px-3 py-1.5 text-center \
        font-semibold text-white";

    html! {
        nav class="pagination mt-4 flex justify-center" aria-label="Páginas"
        {
            ul class="flex flex-wrap items-center gap-1 text-sm"
            {
                @for indicator in indicators {
                    li {
                        @match indicator {
                            PaginationIndicator::BackButton(page) => {
                                a href=(page_url(*page)) rel="prev" class=(PAGE_LINK) { "« Anterior" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(page_url(*page)) rel="next" class=(PAGE_LINK) { "Siguiente »" }
                            }
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(*page)) class=(PAGE_LINK) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                span aria-current="page" class=(CURRENT_PAGE) { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class="px-1 text-gray-400" { "…" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::pagination::{
        PaginationIndicator::{self, BackButton, CurrPage, Ellipsis, NextButton, Page},
        create_pagination_indicators, page_count, page_slice, pagination_view,
    };

    #[test]
    fn single_page_has_no_buttons() {
        assert_eq!(create_pagination_indicators(1, 1, 5), [CurrPage(1)]);
    }

    #[test]
    fn few_pages_are_all_shown() {
        assert_eq!(
            create_pagination_indicators(2, 4, 5),
            [BackButton(1), Page(1), CurrPage(2), Page(3), Page(4), NextButton(3)]
        );
    }

    #[test]
    fn window_near_the_start_skips_to_last_page() {
        assert_eq!(
            create_pagination_indicators(4, 20, 7),
            [
                BackButton(3),
                Page(1),
                Page(2),
                Page(3),
                CurrPage(4),
                Page(5),
                Page(6),
                Page(7),
                Ellipsis,
                Page(20),
                NextButton(5),
            ]
        );
    }

    #[test]
    fn window_in_the_middle_has_ellipses_on_both_sides() {
        assert_eq!(
            create_pagination_indicators(12, 20, 7),
            [
                BackButton(11),
                Page(1),
                Ellipsis,
                Page(9),
                Page(10),
                Page(11),
                CurrPage(12),
                Page(13),
                Page(14),
                Page(15),
                Ellipsis,
                Page(20),
                NextButton(13),
            ]
        );
    }

    #[test]
    fn window_near_the_end_keeps_first_page() {
        assert_eq!(
            create_pagination_indicators(19, 20, 7),
            [
                BackButton(18),
                Page(1),
                Ellipsis,
                Page(14),
                Page(15),
                Page(16),
                Page(17),
                Page(18),
                CurrPage(19),
                Page(20),
                NextButton(20),
            ]
        );
    }

    #[test]
    fn slices_pages_and_clamps_to_last_page() {
        let items = (1..=45).collect::<Vec<_>>();

        assert_eq!(page_count(items.len(), 20), 3);
        assert_eq!(page_count(0, 20), 1);
        assert_eq!(page_slice(&items, 1, 20), &items[0..20]);
        assert_eq!(page_slice(&items, 3, 20), &items[40..45]);
        assert_eq!(page_slice(&items, 9, 20), &items[40..45]);
        assert!(page_slice(&[] as &[i32], 1, 20).is_empty());
    }

    #[test]
    fn links_use_page_url() {
        let indicators: Vec<PaginationIndicator> = create_pagination_indicators(2, 3, 5);

        let html = pagination_view(&indicators, |page| format!("/gastos?page={page}"));

        let html = Html::parse_fragment(&html.into_string());
        let hrefs: Vec<_> = html
            .select(&Selector::parse("nav.pagination a").unwrap())
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert_eq!(
            hrefs,
            [
                "/gastos?page=1",
                "/gastos?page=1",
                "/gastos?page=3",
                "/gastos?page=3"
            ]
        );
    }
}
