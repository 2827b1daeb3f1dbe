use iced::advanced::renderer::Renderer as _;
use iced::advanced::widget::{self, Tree, Widget};
use iced::advanced::{layout, renderer, Clipboard, Layout, Shell};
use iced::mouse;
use iced::{
    Border, Color, Element, Event, Length, Point, Rectangle, Renderer, Size, Theme, Vector,
};

use iced::advanced::Overlay;
use iced::overlay;

const ANCHOR_OFFSET: Vector = Vector::new(12.0, 12.0);
const CARD_PADDING: f32 = 6.0;

/// A display-only tooltip card anchored at the store's mouse position.
///
/// Visibility and anchor are controlled by the application state: the
/// card is shown while the store holds a hovered tooltip entry. Pinned
/// entries get an accent border so they read as kept-alive.
pub(crate) struct TooltipCard<'a, ContentFn>
where
    ContentFn: Fn() -> Element<'a, crate::Message>,
{
    underlay: Element<'a, crate::Message>,
    content: ContentFn,
    show: bool,
    pinned: bool,
    anchor: Point,
}

impl<'a, ContentFn> TooltipCard<'a, ContentFn>
where
    ContentFn: Fn() -> Element<'a, crate::Message>,
{
    pub fn new(underlay: impl Into<Element<'a, crate::Message>>, content: ContentFn) -> Self {
        Self {
            underlay: underlay.into(),
            content,
            show: false,
            pinned: false,
            anchor: Point::ORIGIN,
        }
    }

    #[must_use]
    pub fn show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    #[must_use]
    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    #[must_use]
    pub fn anchor(mut self, anchor: Point) -> Self {
        self.anchor = anchor;
        self
    }

    fn border(&self) -> Border {
        let color = if self.pinned {
            // Accent border marks a pinned card.
            Color::from_rgb(0.12, 0.47, 0.71)
        } else {
            Color::from_rgba(0.0, 0.0, 0.0, 0.35)
        };
        Border {
            color,
            width: 1.0,
            radius: 4.0.into(),
        }
    }
}

impl<'a, ContentFn> std::fmt::Debug for TooltipCard<'a, ContentFn>
where
    ContentFn: Fn() -> Element<'a, crate::Message>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TooltipCard")
            .field("show", &self.show)
            .field("pinned", &self.pinned)
            .field("anchor", &self.anchor)
            .finish_non_exhaustive()
    }
}

impl<'a, ContentFn> Widget<crate::Message, Theme, Renderer> for TooltipCard<'a, ContentFn>
where
    ContentFn: 'a + Fn() -> Element<'a, crate::Message>,
{
    fn tag(&self) -> widget::tree::Tag {
        widget::tree::Tag::of::<State>()
    }

    fn state(&self) -> widget::tree::State {
        widget::tree::State::new(State)
    }

    fn children(&self) -> Vec<Tree> {
        vec![Tree::new(&self.underlay), Tree::new((self.content)())]
    }

    fn diff(&self, tree: &mut Tree) {
        tree.diff_children(&[&self.underlay, &(self.content)()]);
    }

    fn size(&self) -> Size<Length> {
        self.underlay.as_widget().size()
    }

    fn layout(
        &mut self,
        tree: &mut Tree,
        renderer: &Renderer,
        limits: &layout::Limits,
    ) -> layout::Node {
        self.underlay
            .as_widget_mut()
            .layout(&mut tree.children[0], renderer, limits)
    }

    fn draw(
        &self,
        tree: &Tree,
        renderer: &mut Renderer,
        theme: &Theme,
        style: &renderer::Style,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        viewport: &Rectangle,
    ) {
        self.underlay.as_widget().draw(
            &tree.children[0],
            renderer,
            theme,
            style,
            layout,
            cursor,
            viewport,
        );
    }

    fn update(
        &mut self,
        tree: &mut Tree,
        event: &Event,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        renderer: &Renderer,
        clipboard: &mut dyn Clipboard,
        shell: &mut Shell<'_, crate::Message>,
        viewport: &Rectangle,
    ) {
        self.underlay.as_widget_mut().update(
            &mut tree.children[0],
            event,
            layout,
            cursor,
            renderer,
            clipboard,
            shell,
            viewport,
        );
    }

    fn mouse_interaction(
        &self,
        tree: &Tree,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        viewport: &Rectangle,
        renderer: &Renderer,
    ) -> mouse::Interaction {
        self.underlay.as_widget().mouse_interaction(
            &tree.children[0],
            layout,
            cursor,
            viewport,
            renderer,
        )
    }

    fn operate(
        &mut self,
        tree: &mut Tree,
        layout: Layout<'_>,
        renderer: &Renderer,
        operation: &mut dyn widget::Operation,
    ) {
        self.underlay
            .as_widget_mut()
            .operate(&mut tree.children[0], layout, renderer, operation);
    }

    fn overlay<'b>(
        &'b mut self,
        tree: &'b mut Tree,
        layout: Layout<'b>,
        renderer: &Renderer,
        viewport: &Rectangle,
        translation: Vector,
    ) -> Option<overlay::Element<'b, crate::Message, Theme, Renderer>> {
        if !self.show {
            return self.underlay.as_widget_mut().overlay(
                &mut tree.children[0],
                layout,
                renderer,
                viewport,
                translation,
            );
        }

        let mut content = (self.content)();
        content.as_widget_mut().diff(&mut tree.children[1]);

        Some(
            CardOverlay {
                anchor: self.anchor + translation,
                border: self.border(),
                tree: &mut tree.children[1],
                content,
            }
            .into_element(),
        )
    }
}

impl<'a, ContentFn> From<TooltipCard<'a, ContentFn>> for Element<'a, crate::Message>
where
    ContentFn: 'a + Fn() -> Element<'a, crate::Message>,
{
    fn from(widget: TooltipCard<'a, ContentFn>) -> Self {
        Element::new(widget)
    }
}

#[derive(Debug, Default)]
struct State;

struct CardOverlay<'a> {
    anchor: Point,
    border: Border,
    tree: &'a mut Tree,
    content: Element<'a, crate::Message>,
}

impl<'a> CardOverlay<'a> {
    fn into_element(self) -> overlay::Element<'a, crate::Message, Theme, Renderer> {
        overlay::Element::new(Box::new(self))
    }
}

impl Overlay<crate::Message, Theme, Renderer> for CardOverlay<'_> {
    fn layout(&mut self, renderer: &Renderer, bounds: Size) -> layout::Node {
        let limits = layout::Limits::new(Size::ZERO, bounds);

        let mut content = self
            .content
            .as_widget_mut()
            .layout(self.tree, renderer, &limits);

        let card_width = content.size().width + CARD_PADDING * 2.0;
        let card_height = content.size().height + CARD_PADDING * 2.0;

        // Flip to the other side of the anchor when the card would leave
        // the window.
        let mut position = self.anchor + ANCHOR_OFFSET;
        if position.x + card_width > bounds.width {
            position.x = (self.anchor.x - card_width - ANCHOR_OFFSET.x).max(0.0);
        }
        if position.y + card_height > bounds.height {
            position.y = (self.anchor.y - card_height - ANCHOR_OFFSET.y).max(0.0);
        }

        content.move_to_mut(Point::new(
            position.x + CARD_PADDING,
            position.y + CARD_PADDING,
        ));

        layout::Node::with_children(bounds, vec![content])
    }

    fn draw(
        &self,
        renderer: &mut Renderer,
        theme: &Theme,
        style: &renderer::Style,
        layout: Layout<'_>,
        _cursor: mouse::Cursor,
    ) {
        let content_layout = layout
            .children()
            .next()
            .expect("tooltip card: layout should have a content child");
        let content_bounds = content_layout.bounds();

        let card_bounds = Rectangle {
            x: content_bounds.x - CARD_PADDING,
            y: content_bounds.y - CARD_PADDING,
            width: content_bounds.width + CARD_PADDING * 2.0,
            height: content_bounds.height + CARD_PADDING * 2.0,
        };

        renderer.fill_quad(
            renderer::Quad {
                bounds: card_bounds,
                border: self.border,
                ..Default::default()
            },
            Color::from_rgb(1.0, 1.0, 1.0),
        );

        self.content.as_widget().draw(
            self.tree,
            renderer,
            theme,
            style,
            content_layout,
            mouse::Cursor::Unavailable,
            &layout.bounds(),
        );
    }

    fn update(
        &mut self,
        _event: &Event,
        _layout: Layout<'_>,
        _cursor: mouse::Cursor,
        _renderer: &Renderer,
        _clipboard: &mut dyn Clipboard,
        _shell: &mut Shell<'_, crate::Message>,
    ) {
        // Display-only: the card must never swallow pointer events meant
        // for the marks underneath.
    }

    fn mouse_interaction(
        &self,
        _layout: Layout<'_>,
        _cursor: mouse::Cursor,
        _renderer: &Renderer,
    ) -> mouse::Interaction {
        mouse::Interaction::None
    }

    fn index(&self) -> f32 {
        // Keep the card above every other overlay.
        10_000.0
    }
}
