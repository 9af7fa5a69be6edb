/*!

# Quick start with Google Forms

This example runs a poll end to end, using Google Forms to collect the votes. Google Forms is free to use and
accepts a large number of answers. Other providers (Microsoft Forms for instance) offer a similar export.

We would like to decide between 3 candidates: Alice, Bob and Charlie.

**Creating a poll** Create a new form with one question of type **Multiple Choice Grid**.
The rows are the candidates (`Alice`, `Bob`, `Charlie`), the columns are the ranks (`1st`, `2nd`, `3rd`).
Enable "Limit to one response per column" so that two candidates cannot share the same rank.
Voters do not have to rank every candidate: a ballot that only ranks `Alice` is a valid ballot.

**Voting process** Share the form with the voters, for instance using the "Share" button.

**Getting the results** When the poll is over, open the `Responses` tab and download the responses
in the **CSV format**. The file looks like the following:

```text
Timestamp,Rank the candidates [Alice],Rank the candidates [Bob],Rank the candidates [Charlie]
2023/10/01 10:00:00,1st,2nd,
2023/10/01 10:01:00,,1st,2nd
2023/10/01 10:02:00,2nd,,1st
```

Run `irvflow` with the following command (the name of the file may differ for you):

```bash
irvflow -i 'responses.csv' --input-type csv_likert
```

The candidates are read from the header, starting with the second column. Each cell holds the rank that the
voter gave to the candidate of the column. Ranks may be written as `1st`, `2nd`, `3rd` or as plain numbers.
If the columns of your grid have other names, list them from the first choice to the last one with `--choices`:

```bash
irvflow -i 'responses.csv' --input-type csv_likert --choices "First choice,Second choice,Third choice"
```

After running this command, you should see the outcome of the election:

```text
1st round results:
Rank the candidates [Alice]: 1 vote (33.33% of total)
Rank the candidates [Bob]: 1 vote (33.33% of total)
Rank the candidates [Charlie]: 1 vote (33.33% of total)
Eliminated candidates: Rank the candidates [Alice] Rank the candidates [Bob] Rank the candidates [Charlie]
The remaining candidates are tied

Winner: Tie
```

With only these three ballots, every candidate has the same number of votes, so they are all eliminated together
and the election ends in a tie. Your results will vary depending on the contents of the votes.

To use shorter names, rename the columns of the header or pass the names of the columns with `--candidates`.

**Flow of the votes** `irvflow` can write a JSON summary of the election with the `--out` flag. Besides the
results of each round, it contains the transfers of the votes between rounds and the nodes and links of a
flow (Sankey) diagram, ready to be given to a plotting library:

```bash
irvflow -i 'responses.csv' --input-type csv_likert --out my_election_results.json
```

You can explore the following sections:
- to describe an election with several files or specific rules, check the documentation of
  the `--config` flag in the [configuration section](../manual/index.html#configuration).
- if your input is in a different format, check the [input formats](../manual/index.html#input-formats).

*/
